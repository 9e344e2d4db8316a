use std::io::{ErrorKind, Write};
use std::sync::mpsc::{self, Receiver, Sender};

/// A consumer of JSON telemetry events.
///
/// Subscribers report their own state. The hub skips closed subscribers but
/// leaves them registered until [`SubscriberHub::prune_closed`] is called.
///
/// [`SubscriberHub::prune_closed`]: crate::SubscriberHub::prune_closed
pub trait Subscriber: Send {
    /// Identifier for logs.
    fn id(&self) -> &str;

    /// Whether events should be delivered.
    fn is_open(&self) -> bool;

    /// Deliver one event. A failed send closes the subscriber.
    fn send(&mut self, event: &str) -> std::io::Result<()>;
}

/// Writes newline-delimited JSON events to any writer.
pub struct StreamSubscriber<W> {
    id: String,
    writer: W,
    open: bool,
}

impl<W: Write + Send> StreamSubscriber<W> {
    /// Wrap a writer.
    pub fn new(id: impl Into<String>, writer: W) -> Self {
        Self {
            id: id.into(),
            writer,
            open: true,
        }
    }

    /// Stop delivering to this subscriber.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the subscriber and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: &str) -> std::io::Result<()> {
        self.writer.write_all(event.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write + Send> Subscriber for StreamSubscriber<W> {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, event: &str) -> std::io::Result<()> {
        let result = self.write_event(event);
        if result.is_err() {
            self.open = false;
        }
        result
    }
}

/// Forwards events to an in-process receiver.
///
/// Closes once the receiving half is dropped.
pub struct ChannelSubscriber {
    id: String,
    tx: Sender<String>,
    open: bool,
}

/// Create a channel subscriber and the receiver its events arrive on.
pub fn channel_subscriber(id: impl Into<String>) -> (ChannelSubscriber, Receiver<String>) {
    let (tx, rx) = mpsc::channel();
    let subscriber = ChannelSubscriber {
        id: id.into(),
        tx,
        open: true,
    };
    (subscriber, rx)
}

impl Subscriber for ChannelSubscriber {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, event: &str) -> std::io::Result<()> {
        self.tx.send(event.to_owned()).map_err(|_| {
            self.open = false;
            std::io::Error::new(ErrorKind::BrokenPipe, "event receiver dropped")
        })
    }
}

/// Hands each event to a closure.
///
/// An `Err` from the closure closes the subscriber like any other failed send.
pub struct CallbackSubscriber<F> {
    id: String,
    callback: F,
    open: bool,
}

impl<F> CallbackSubscriber<F>
where
    F: FnMut(&str) -> std::io::Result<()> + Send,
{
    pub fn new(id: impl Into<String>, callback: F) -> Self {
        Self {
            id: id.into(),
            callback,
            open: true,
        }
    }
}

impl<F> Subscriber for CallbackSubscriber<F>
where
    F: FnMut(&str) -> std::io::Result<()> + Send,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send(&mut self, event: &str) -> std::io::Result<()> {
        let result = (self.callback)(event);
        if result.is_err() {
            self.open = false;
        }
        result
    }
}
