use std::time::Duration;

use looseconf::Config;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct User {
    name: String,
}

fn main() -> Result<(), looseconf::ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load("demos/app.conf").map_err(|e| e.into_parts().1)?;
    println!("Loaded {}", config.conf_path().display());

    let http = config.section("http")?;
    println!(
        "Listening on {}:{} (timeout {:?})",
        http.string("addr", "0.0.0.0"),
        http.int("ports[1]", 80),
        http.duration("timeout", Duration::from_secs(30)),
    );

    let users: Vec<User> = config.decode("users")?;
    for (i, user) in users.iter().enumerate() {
        let admin = config.bool(&format!("users[{i}].admin"), false);
        println!("User {} (admin={admin})", user.name);
    }

    Ok(())
}
