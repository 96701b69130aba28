pub mod config;

pub use config::{active_profile, load_dotenv, profile_label};
