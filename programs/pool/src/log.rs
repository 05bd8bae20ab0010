//! Formatted program log lines for numeric values

use pinocchio_log::logger::Logger;

/// `"<label> <value>"`
#[inline]
pub fn log_value(label: &str, value: u64) {
    let mut logger = Logger::<96>::default();
    logger.append(label);
    logger.append(" ");
    logger.append(value);
    logger.log();
}

/// `"<label> <a> <b>"`
#[inline]
pub fn log_pair(label: &str, a: u64, b: u64) {
    let mut logger = Logger::<128>::default();
    logger.append(label);
    logger.append(" ");
    logger.append(a);
    logger.append(" ");
    logger.append(b);
    logger.log();
}
