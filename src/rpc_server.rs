//! Deckodecko RPC Server: JSON-RPC over stdin/stdout for the app shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"item.create", "params":{"gacha_id":7,"type":"WISH","name":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}

use std::time::Instant;

use deckodecko::app::App;
use deckodecko::logging;
use deckodecko::platform;
use deckodecko::rpc_handler::handle_method;
use deckodecko::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

/// Fixed-window rate limiter over all methods.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

async fn reply(stdout: &mut io::Stdout, frame: Value) -> io::Result<()> {
    let mut line = frame.to_string();
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main]
async fn main() {
    {
        let mut settings = SettingsEngine::new(None);
        let level = settings
            .load()
            .map(|s| s.logging.level)
            .unwrap_or_else(|_| "info".to_string());
        logging::init_logging(&level);
    }

    let data_dir = platform::resolve_data_dir();
    let mut app = match App::open(&data_dir, None) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, data_dir = %data_dir.display(), "failed to initialize");
            std::process::exit(1);
        }
    };
    if let Err(e) = app.startup().await {
        // storage calls retry the open; the flag keeps the upgrade pending
        warn!(error = %e, "startup incomplete");
    }

    let mut stdout = io::stdout();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if reply(&mut stdout, ready).await.is_err() {
        return;
    }
    info!(data_dir = %data_dir.display(), "rpc server ready");

    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                if !rate_limiter.check() {
                    json!({"id": id, "error": "rate limit exceeded"})
                } else {
                    let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                    let params = req.get("params").cloned().unwrap_or(json!({}));
                    match handle_method(&app, method, &params).await {
                        Ok(val) => json!({"id": id, "result": val}),
                        Err(err) => json!({"id": id, "error": err}),
                    }
                }
            }
        };

        if reply(&mut stdout, response).await.is_err() {
            break;
        }
    }

    app.shutdown().await;
}
