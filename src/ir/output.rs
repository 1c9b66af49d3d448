use std::fmt::Debug;
use std::sync::{mpsc, Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;

use rppal::pwm::{Channel, Polarity, Pwm};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::spawn_blocking;

use crate::ir::types::{IrSequence, IrTarget};
use crate::HwError;

const IR_PWM_CHANNEL: Channel = Channel::Pwm0;

const CARRIER_FREQUENCY_HZ: f64 = 40_000.0;
const CARRIER_DUTY_CYCLE: f64 = 0.33;

const WAIT_TIMEOUT: Duration = Duration::from_micros(100);

#[derive(Error, Debug)]
pub enum IrOutError<E: IrTarget + Debug> {
    #[error(transparent)]
    Hw(#[from] HwError),
    #[error(transparent)]
    IrTarget(E::Error),
    #[error("Could not send message to ir thread")]
    Send,
}

pub type Result<T, E> = std::result::Result<T, IrOutError<E>>;

pub struct IrOut<T: 'static + IrTarget> {
    target: T,
    sequence_sender: mpsc::Sender<IrSequence>,
    send_stop_sender: watch::Sender<bool>,
}

impl<T: 'static + IrTarget + Debug> IrOut<T> {
    pub fn start(channel: Channel, target: T) -> Result<IrOut<T>, T> {
        let pwm = Arc::new(Mutex::new(
            Pwm::with_frequency(
                channel,
                CARRIER_FREQUENCY_HZ,
                CARRIER_DUTY_CYCLE,
                Polarity::Normal,
                false,
            )
            .map_err(|_| HwError::Initialization)?,
        ));
        let (send_stop_sender, send_stop_receiver) = watch::channel(false);
        let (sequence_sender, sequence_receiver) = mpsc::channel::<IrSequence>();
        spawn_blocking(move || loop {
            if *send_stop_receiver.borrow() {
                trace!("stopping ir sender thread");
                break;
            }

            match sequence_receiver.recv_timeout(WAIT_TIMEOUT) {
                Ok(seq) => {
                    let pwm = pwm.clone();
                    spawn_blocking(move || match pwm.lock() {
                        Err(_) => {
                            error!("Could not get lock for ir output!");
                        }
                        Ok(p) => {
                            if let Err(e) = play_sequence(&p, seq) {
                                error!("Could not drive pwm for ir output: {:?}", e);
                            }
                        }
                    });
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    // nothing from seq receiver for a bit, so loop to check if stop received
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    info!("ir sequence sender disconnected before stop signal");
                    break;
                }
            }
        });
        Ok(IrOut {
            target,
            sequence_sender,
            send_stop_sender,
        })
    }

    pub fn default_channel(target: T) -> Result<Self, T> {
        Self::start(IR_PWM_CHANNEL, target)
    }

    pub fn send(&self, seq: IrSequence) -> Result<(), T> {
        debug!("sending sequence: {:?}", seq);
        self.sequence_sender.send(seq).map_err(|_| IrOutError::Send)
    }

    pub fn stop(&mut self) -> Result<(), T> {
        self.send_stop_sender
            .send(true)
            .map_err(|_| IrOutError::Send)
    }

    pub fn send_target<F: FnMut(&mut T) -> std::result::Result<IrSequence, T::Error>>(
        &mut self,
        mut action: F,
    ) -> Result<(), T> {
        let sequence = action(&mut self.target).map_err(IrOutError::IrTarget)?;
        self.send(sequence)
    }
}

// Marks sit at even offsets, spaces at odd ones; the carrier is enabled for
// the former and disabled for the latter.
fn play_sequence(pwm: &Pwm, seq: IrSequence) -> std::result::Result<(), rppal::pwm::Error> {
    for (i, pulse) in seq.into_inner().into_iter().enumerate() {
        if i % 2 == 0 {
            pwm.enable()?;
        } else {
            pwm.disable()?;
        }
        sleep(Duration::from_micros(pulse.into_inner() as u64));
    }
    pwm.disable()
}
