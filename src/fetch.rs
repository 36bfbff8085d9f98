//! Worker thread that runs blocking question fetches off the UI thread.
//!
//! The shell sends [`FetchRequest`]s in as selections happen and polls
//! replies out of its event loop. Supersede semantics live entirely in the
//! ticket check inside [`crate::app::App::deliver`]; the worker itself just
//! answers every request in order.

use std::sync::mpsc;
use std::thread;

use crate::app::FetchRequest;
use crate::generator::{GenerationError, QuestionSource};
use crate::question::QuestionSet;

pub struct FetchReply {
    pub ticket: u64,
    pub result: Result<QuestionSet, GenerationError>,
}

pub struct Fetcher {
    tx: mpsc::Sender<FetchRequest>,
    rx: mpsc::Receiver<FetchReply>,
}

impl Fetcher {
    pub fn spawn(mut source: Box<dyn QuestionSource + Send>) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<FetchRequest>();
        let (reply_tx, reply_rx) = mpsc::channel();

        thread::spawn(move || {
            for req in req_rx {
                let result = source.fetch(req.mode, req.count);
                let reply = FetchReply {
                    ticket: req.ticket,
                    result,
                };
                if reply_tx.send(reply).is_err() {
                    return;
                }
            }
        });

        Self {
            tx: req_tx,
            rx: reply_rx,
        }
    }

    /// Queue a fetch. Returns false if the worker has shut down.
    pub fn request(&self, req: FetchRequest) -> bool {
        self.tx.send(req).is_ok()
    }

    /// Non-blocking poll for the next finished fetch.
    pub fn try_reply(&self) -> Option<FetchReply> {
        self.rx.try_recv().ok()
    }

    /// Block until the next finished fetch.
    pub fn next_reply(&self) -> anyhow::Result<FetchReply> {
        Ok(self.rx.recv()?)
    }
}
