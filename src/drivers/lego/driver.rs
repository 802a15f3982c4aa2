// Hardware ID's
pub const VID: u16 = 0x17ef;
pub const XINPUT_PID: u16 = 0x6182;

/// DMI product name of the Legion Go handheld
pub const DMI_PRODUCT_NAME: &str = "83E1";

// Report ID's
pub const XINPUT_DATA: u8 = 0x04;

// Input report sizes
pub const XINPUT_PACKET_SIZE: usize = 60;

// Button bit locations inside the xinput report
pub const MODE_LOCATION: usize = 18 * 8;
pub const SHARE_LOCATION: usize = 18 * 8 + 1;
pub const LS_LOCATION: usize = 18 * 8 + 2;
pub const RS_LOCATION: usize = 18 * 8 + 3;
pub const DPAD_UP_LOCATION: usize = 18 * 8 + 4;
pub const DPAD_DOWN_LOCATION: usize = 18 * 8 + 5;
pub const DPAD_LEFT_LOCATION: usize = 18 * 8 + 6;
pub const DPAD_RIGHT_LOCATION: usize = 18 * 8 + 7;
pub const A_LOCATION: usize = 19 * 8;
pub const B_LOCATION: usize = 19 * 8 + 1;
pub const X_LOCATION: usize = 19 * 8 + 2;
pub const Y_LOCATION: usize = 19 * 8 + 3;
pub const LB_LOCATION: usize = 19 * 8 + 4;
pub const RB_LOCATION: usize = 19 * 8 + 6;
pub const EXTRA_L1_LOCATION: usize = 20 * 8;
pub const EXTRA_L2_LOCATION: usize = 20 * 8 + 1;
pub const EXTRA_R1_LOCATION: usize = 20 * 8 + 2;
pub const EXTRA_R3_LOCATION: usize = 20 * 8 + 4;
pub const EXTRA_R2_LOCATION: usize = 20 * 8 + 5;
pub const SELECT_LOCATION: usize = 20 * 8 + 6;
pub const START_LOCATION: usize = 20 * 8 + 7;
