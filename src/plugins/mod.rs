//! Built-in domain plugins.

pub mod orders;
pub mod products;
pub mod users;

use crate::plugin::PluginFactory;

/// Load order of the built-in plugins.
pub fn builtin_plugins() -> Vec<PluginFactory> {
    vec![
        PluginFactory::new(users::NAME, users::plugin),
        PluginFactory::new(products::NAME, products::plugin),
        PluginFactory::new(orders::NAME, orders::plugin),
    ]
}
