use reqwest::Client;
use std::time::Duration;

pub const APP_USER_AGENT: &str = concat!("Minecraft-Server-Builder/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_the_crate_user_agent() {
        build_http_client().unwrap();
        assert!(APP_USER_AGENT.starts_with("Minecraft-Server-Builder/"));
    }
}
