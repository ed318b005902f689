use embedded_hal::digital::InputPin;
use rp2040_hal::gpio::{DynPinId, DynPullType, FunctionSioInput, Pin};

use generic::channel::{InputChannel, PinDirection, Pull};
use generic::encoder_error::EncoderError;

pub type EncoderPin = Pin<DynPinId, FunctionSioInput, DynPullType>;

/// One encoder line on an RP2040 SIO input.
pub struct Rp2040Channel {
    pin: EncoderPin,
}

impl Rp2040Channel {
    pub fn new(pin: EncoderPin) -> Self {
        Self { pin }
    }
}

fn pull_type(pull: Pull) -> DynPullType {
    match pull {
        Pull::None => DynPullType::None,
        Pull::Up => DynPullType::Up,
        Pull::Down => DynPullType::Down,
    }
}

impl InputChannel for Rp2040Channel {
    fn pin_id(&self) -> u8 {
        self.pin.id().num
    }

    fn configure(&mut self, pull: Pull, direction: PinDirection) -> Result<(), EncoderError> {
        match direction {
            PinDirection::Input => {
                self.pin.set_pull_type(pull_type(pull));
                self.pin.set_input_enable(true);
            }
            PinDirection::Disabled => {
                self.pin.set_pull_type(DynPullType::None);
                self.pin.set_input_enable(false);
            }
        }
        Ok(())
    }

    fn read_level(&mut self) -> Result<bool, EncoderError> {
        self.pin.is_high().map_err(|_| EncoderError::GpioPinError)
    }
}
