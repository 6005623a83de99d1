//! Settings HTTP server (ESP-IDF only).
//!
//! | Route        | Method | Response                                   |
//! |--------------|--------|--------------------------------------------|
//! | `/`          | GET    | status page with the settings form         |
//! | `/settings/` | POST   | apply form, 302 back to `/`                |
//! | `/settings/` | other  | 405 `Method Not Allowed`                   |
//! | `/api`       | GET    | [`StatusView`] as JSON                     |
//! | anything else|        | 404 with the request echoed back           |
//!
//! Handlers run on the httpd task. They only read the latest published
//! [`StatusView`] and forward new settings to the control loop over a
//! channel; the loop owns persistence.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use embedded_svc::http::{Headers, Method};
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::server::{Configuration, EspHttpConnection, EspHttpServer, Request};
use log::{info, warn};

use crate::app::commands::AppCommand;
use crate::app::status::StatusView;
use crate::ui;

const MAX_FORM_BODY: usize = 512;

type Req<'a, 'b> = Request<&'a mut EspHttpConnection<'b>>;

pub fn start_web(
    status: Arc<Mutex<StatusView>>,
    commands: Sender<AppCommand>,
) -> anyhow::Result<EspHttpServer<'static>> {
    let cfg = Configuration {
        stack_size: 10 * 1024,
        uri_match_wildcard: true,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&cfg)?;

    {
        let status = status.clone();
        server.fn_handler::<anyhow::Error, _>("/", Method::Get, move |req| {
            let view = snapshot(&status)?;
            let html = ui::render_index(&view);
            req.into_response(200, Some("OK"), &[("Content-Type", "text/html")])?
                .write_all(html.as_bytes())?;
            Ok(())
        })?;
    }

    server.fn_handler::<anyhow::Error, _>("/settings/", Method::Post, move |mut req| {
        let body = read_body(&mut req)?;
        let settings = ui::parse_settings_form(&String::from_utf8_lossy(&body));
        info!(
            "Web: settings form high={} low={} offset={}",
            settings.high_threshold, settings.low_threshold, settings.timezone_offset_hours
        );
        if commands.send(AppCommand::UpdateSettings(settings)).is_err() {
            warn!("Web: control loop gone, settings dropped");
        }
        req.into_response(302, Some("Found"), &[("Location", "/")])?;
        Ok(())
    })?;

    for method in [Method::Get, Method::Put, Method::Delete] {
        server.fn_handler::<anyhow::Error, _>("/settings/", method, move |req| {
            req.into_response(
                405,
                Some("Method Not Allowed"),
                &[("Content-Type", "text/plain")],
            )?
            .write_all(b"Method Not Allowed")?;
            Ok(())
        })?;
    }

    server.fn_handler::<anyhow::Error, _>("/api", Method::Get, move |req| {
        let view = snapshot(&status)?;
        let body = serde_json::to_vec(&view)?;
        req.into_response(200, Some("OK"), &[("Content-Type", "application/json")])?
            .write_all(&body)?;
        Ok(())
    })?;

    for method in [Method::Get, Method::Post] {
        server.fn_handler::<anyhow::Error, _>("/*", method, not_found)?;
    }

    info!("Web: server listening on port {}", cfg.http_port);
    Ok(server)
}

fn not_found(mut req: Req<'_, '_>) -> anyhow::Result<()> {
    let uri = req.uri().to_string();
    let (path, query) = uri.split_once('?').unwrap_or((uri.as_str(), ""));
    let mut args = ui::parse_form(query);
    let method = match req.method() {
        Method::Post => {
            let body = read_body(&mut req)?;
            args.extend(ui::parse_form(&String::from_utf8_lossy(&body)));
            "POST"
        }
        _ => "GET",
    };
    let msg = ui::not_found_message(path, method, &args);
    req.into_response(404, Some("Not Found"), &[("Content-Type", "text/plain")])?
        .write_all(msg.as_bytes())?;
    Ok(())
}

fn snapshot(status: &Mutex<StatusView>) -> anyhow::Result<StatusView> {
    status
        .lock()
        .map(|s| s.clone())
        .map_err(|_| anyhow!("status lock poisoned"))
}

fn read_body(req: &mut Req<'_, '_>) -> anyhow::Result<Vec<u8>> {
    let len = req.content_len().unwrap_or(0) as usize;
    if len > MAX_FORM_BODY {
        return Err(anyhow!("request body too large ({len} bytes)"));
    }
    let mut body = vec![0_u8; len];
    if len > 0 {
        req.read_exact(&mut body)?;
    }
    Ok(body)
}
