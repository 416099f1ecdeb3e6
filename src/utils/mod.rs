mod format_utils;
mod perf;
mod time_utils;

pub use format_utils::{format_price, format_signed, format_volume};
pub use perf::report_elapsed;
pub use time_utils::{
    AppInstant, TimeUtils, epoch_sec_to_date_string, epoch_sec_to_date_time_string,
};
