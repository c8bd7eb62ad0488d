#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use sourcebit_router::{handler, Handler, HandlerError};

/// Shared record of which handlers ran, in order.
pub type Log = Arc<Mutex<Vec<&'static str>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}

/// A handler that commits a fixed text body.
pub fn reply(body: &'static str) -> impl Handler {
    handler(move |_req, res| {
        Box::pin(async move {
            res.text(body);
            Ok(())
        })
    })
}

/// A handler that records `label` and continues.
pub fn mark(log: &Log, label: &'static str) -> impl Handler {
    let log = Arc::clone(log);
    handler(move |_req, _res| {
        let log = Arc::clone(&log);
        Box::pin(async move {
            log.lock().unwrap().push(label);
            Ok(())
        })
    })
}

/// A handler that records `label` and commits `status` with no body.
pub fn halt(log: &Log, label: &'static str, status: u16) -> impl Handler {
    let log = Arc::clone(log);
    handler(move |_req, res| {
        let log = Arc::clone(&log);
        Box::pin(async move {
            log.lock().unwrap().push(label);
            res.status(status).end();
            Ok(())
        })
    })
}

/// A handler that fails with `message`.
pub fn fail(message: &'static str) -> impl Handler {
    handler(move |_req, _res| Box::pin(async move { Err(HandlerError::new(message)) }))
}

/// A handler that echoes a path parameter.
pub fn echo_param(name: &'static str) -> impl Handler {
    handler(move |req, res| {
        Box::pin(async move {
            let value = req.params.get(name).unwrap_or_default().to_string();
            res.text(format!("{name}={value}"));
            Ok(())
        })
    })
}
