//! Event sources and the session loop

use crate::error::MeasureError;
use crate::event::InputEvent;
use crate::session::{SessionController, SessionUpdate};

/// Blocking, in-order supplier of input events.
///
/// `Ok(None)` signals end of stream. Errors terminate the session.
pub trait EventSource {
    fn next_event(&mut self) -> Result<Option<InputEvent>, MeasureError>;
}

/// Source backed by an in-memory list of events
#[derive(Debug, Clone)]
pub struct EventList {
    events: std::vec::IntoIter<InputEvent>,
}

impl EventList {
    pub fn new(events: Vec<InputEvent>) -> Self {
        Self {
            events: events.into_iter(),
        }
    }
}

impl EventSource for EventList {
    fn next_event(&mut self) -> Result<Option<InputEvent>, MeasureError> {
        Ok(self.events.next())
    }
}

/// Pull events from `source` until end of stream, handing each update to `sink`.
///
/// Returns the number of events processed. The first error from the source,
/// the controller or the sink aborts the loop.
pub fn run_session<S, F>(
    source: &mut S,
    controller: &mut SessionController,
    mut sink: F,
) -> Result<usize, MeasureError>
where
    S: EventSource + ?Sized,
    F: FnMut(SessionUpdate) -> Result<(), MeasureError>,
{
    let mut processed = 0;
    while let Some(event) = source.next_event()? {
        processed += 1;
        if let Some(update) = controller.handle(&event)? {
            sink(update)?;
        }
    }
    Ok(processed)
}
