use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// Message pump for the UI thread.
///
/// The handler is called with `None` once per tick (for redraws and clock
/// driven widgets such as the countdown) and with `Some(event)` for every
/// input event. Bursts of events are drained before the next tick so mouse
/// drags do not lag behind the pointer.
pub struct EventLoop<D> {
    driver: D,
    tick: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, tick: Duration) -> Self {
        Self { driver, tick }
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(None)? {
                return Ok(());
            }
            if !self.driver.poll(self.tick)? {
                continue;
            }
            loop {
                let event = self.driver.read()?;
                if let ControlFlow::Quit = handler(Some(event))? {
                    return Ok(());
                }
                if !self.driver.poll(Duration::from_millis(0))? {
                    break;
                }
            }
        }
    }
}
