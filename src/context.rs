use crate::properties::{Properties, PropertyValue};

/// Supplies the static context bundle attached to every envelope.
///
/// Called once at client initialization; the result is treated as immutable
/// for the process lifetime. Hosts with richer platform metadata (device
/// model, screen dimensions, network reachability) implement this trait to
/// supply their own bundle.
///
/// ```no_run
/// # use beacon::ClientConfig;
/// let config = ClientConfig::from_api_key("api-key").context_provider(|| {
///     [("channel".to_owned(), "desktop".into())].into_iter().collect()
/// });
/// ```
pub trait ContextProvider {
    /// Produce the context bundle.
    fn context(&self) -> Properties;
}

impl<T: Fn() -> Properties> ContextProvider for T {
    fn context(&self) -> Properties {
        self()
    }
}

/// The default [`ContextProvider`]: portable process metadata only.
///
/// Collects the SDK library name and version, the operating system family and
/// architecture, and the locale when the environment exposes one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemContext;

impl ContextProvider for SystemContext {
    fn context(&self) -> Properties {
        let mut context = Properties::new();

        context.insert(
            "library".to_owned(),
            PropertyValue::Object(
                [
                    ("name".to_owned(), env!("CARGO_PKG_NAME").into()),
                    ("version".to_owned(), env!("CARGO_PKG_VERSION").into()),
                ]
                .into_iter()
                .collect(),
            ),
        );

        context.insert(
            "os".to_owned(),
            PropertyValue::Object(
                [
                    ("name".to_owned(), std::env::consts::OS.into()),
                    ("arch".to_owned(), std::env::consts::ARCH.into()),
                ]
                .into_iter()
                .collect(),
            ),
        );

        if let Ok(locale) = std::env::var("LANG") {
            if !locale.is_empty() {
                context.insert("locale".to_owned(), locale.into());
            }
        }

        context
    }
}
