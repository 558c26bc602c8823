//! Hot reload demo.
//!
//! # Running
//!
//! ```bash
//! cargo run -p hotconf --example hot_reload
//!
//! # In another terminal, edit the file the demo prints
//! echo 'port = 9090' >> /tmp/hotconf_demo.conf
//! ```
//!
//! Set `RUST_LOG=hotconf=debug` to watch the reloads happen.

use std::fs;
use std::thread;
use std::time::Duration;

use hotconf::Store;
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hotconf=info")),
        )
        .init();

    let path = std::env::temp_dir().join("hotconf_demo.conf");
    fs::write(
        &path,
        "# hotconf demo\nname = demo\n\n[server]\nhost = \"127.0.0.1\"\nport = 8080\n",
    )
    .map_err(|e| hotconf::Error::io(&path, e))?;

    println!("Config file: {}", path.display());
    println!("Modify this file to see hot reload in action!\n");

    let store = Store::builder(&path)
        .reload(true)
        .debounce(Duration::from_millis(200))
        .open()?;

    let mut last_epoch = store.epoch();
    for _ in 0..60 {
        if store.epoch() != last_epoch {
            last_epoch = store.epoch();
            println!("-- reloaded (epoch {last_epoch})");
        }

        println!(
            "{} on {}:{}",
            store.get("name", "unnamed"),
            store.get_value("server", "host", "localhost"),
            store.get_value("server", "port", "80"),
        );
        thread::sleep(Duration::from_secs(1));
    }

    store.close();
    Ok(())
}
