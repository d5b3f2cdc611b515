// Pagefreeze services
// Origin resolution, durable storage, the freeze decision and the neutralizer payload.

pub mod freeze_engine;
pub mod kv_store;
pub mod neutralizer;
pub mod origin_resolver;
pub mod preference_store;
pub mod settings_engine;
