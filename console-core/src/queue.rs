//! Cross-thread command submission
//!
//! A producer thread never touches the terminal's buffers. It records into a
//! detached `CellBuffer`, then sends the batch; the terminal appends batches to
//! the target stream at the start of the next frame, in the order they were
//! sent.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::buffer::CellBuffer;
use crate::command::PaintCommand;

/// Producer half of a command channel
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Vec<PaintCommand>>,
}

/// Consumer half of a command channel, drained by the terminal
#[derive(Debug)]
pub struct CommandReceiver {
    rx: Receiver<Vec<PaintCommand>>,
    disconnected: bool,
}

/// Create a connected sender/receiver pair
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel();
    (
        CommandSender { tx },
        CommandReceiver {
            rx,
            disconnected: false,
        },
    )
}

impl CommandSender {
    /// Send a batch; returns false once the receiver is gone
    pub fn send(&self, commands: Vec<PaintCommand>) -> bool {
        if commands.is_empty() {
            return true;
        }
        self.tx.send(commands).is_ok()
    }

    /// Move every command queued in `buffer` into one batch
    pub fn submit(&self, buffer: &mut CellBuffer) -> bool {
        self.send(buffer.take_commands())
    }
}

impl CommandReceiver {
    /// Append every pending batch to `target`; returns the command count
    pub fn drain_into(&mut self, target: &mut CellBuffer) -> usize {
        let mut count = 0;
        loop {
            match self.rx.try_recv() {
                Ok(batch) => {
                    count += batch.len();
                    target.extend_commands(batch);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        count
    }

    /// Whether every sender has been dropped and the channel is empty
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_batches_keep_order() {
        let (tx, mut rx) = command_channel();
        let mut producer = CellBuffer::new(80, 25);
        producer.cputsxy(0, 0, "ab");
        assert!(tx.submit(&mut producer));
        producer.cputsxy(0, 1, "c");
        assert!(tx.submit(&mut producer));

        let mut target = CellBuffer::new(80, 25);
        assert_eq!(rx.drain_into(&mut target), 3);
        let codepoints: Vec<char> = target
            .commands()
            .iter()
            .filter_map(|cmd| match cmd {
                PaintCommand::Character(cell) => Some(cell.codepoint),
                PaintCommand::Rectangle(_) => None,
            })
            .collect();
        assert_eq!(codepoints, vec!['a', 'b', 'c']);
        assert!(!rx.is_disconnected());
    }

    #[test]
    fn test_producer_thread() {
        let (tx, mut rx) = command_channel();
        let handle = thread::spawn(move || {
            let mut buffer = CellBuffer::new(80, 25);
            for row in 0..10 {
                buffer.cputsxy(0, row, "line");
                tx.submit(&mut buffer);
            }
        });
        handle.join().unwrap();

        let mut target = CellBuffer::new(80, 25);
        assert_eq!(rx.drain_into(&mut target), 40);
        assert!(rx.is_disconnected());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (tx, rx) = command_channel();
        drop(rx);
        let mut buffer = CellBuffer::new(4, 4);
        buffer.cputs('x');
        assert!(!tx.submit(&mut buffer));
    }
}
