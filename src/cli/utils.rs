use simple_error::{SimpleResult, bail};

/// Check a required input filename
///
/// Assumes no logger has been configured yet
///
pub fn check_required_filename(filename: &str, label: &str) -> SimpleResult<()> {
    if filename.is_empty() {
        bail!("Must specify {label} file");
    }
    let path = std::path::Path::new(&filename);
    if !path.exists() {
        bail!("Can't find specified {label} file: '{filename}'");
    }
    if !path.is_file() {
        bail!("Specified {label} file path does not appear to be a file: '{filename}'");
    }
    Ok(())
}

/// Check that a distance threshold is strictly positive
///
pub fn check_positive_distance<T>(value: T, zero: T, arg_name: &str) -> SimpleResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    // NaN is rejected along with non-positive values
    if value.partial_cmp(&zero) != Some(std::cmp::Ordering::Greater) {
        bail!("--{arg_name} argument must be greater than 0, found '{value}'");
    }
    Ok(())
}
