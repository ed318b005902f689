// BSP revision: A (integration test board)
macro_rules! define_pins {
    ($($alias:ident, $pin:tt),*) => {
        $(
	    #[macro_export]
            macro_rules! $alias {
                ($pins:expr) => {
                    $pins.$pin
                };
            }
        )*
    };
}

/// GPIO numbers of channels A, B, C. Must agree with the macros below.
pub const ENCODER_PINS: (u8, u8, u8) = (29, 28, 27);

define_pins! {
    // optical linear encoder
    encoder_ch_a, gpio29,
    encoder_ch_b, gpio28,
    encoder_ch_c, gpio27
}
