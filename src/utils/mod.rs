pub mod clock;
pub mod net_utils;
pub mod probe_data;
pub mod ui;
