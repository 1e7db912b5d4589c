//! Cached value of the `Date` response header

use may::sync::Mutex;
use time::OffsetDateTime;

// IMF-fixdate, RFC 7231 section 7.1.1.1
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

struct CachedDate {
    second: i64,
    value: String,
}

lazy_static! {
    static ref CACHED: Mutex<CachedDate> = Mutex::new(CachedDate {
        second: i64::min_value(),
        value: String::new(),
    });
}

/// the current date, formatting at most once per second
pub fn now() -> String {
    let now = OffsetDateTime::now_utc();
    let second = now.unix_timestamp();
    let mut cached = match CACHED.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if cached.second != second {
        cached.second = second;
        cached.value = now.format(DATE_FORMAT);
    }
    cached.value.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_shape() {
        let date = now();
        // "Sun, 06 Nov 1994 08:49:37 GMT"
        assert_eq!(date.len(), 29, "{}", date);
        assert!(date.ends_with(" GMT"));
        assert_eq!(&date[3..5], ", ");
    }
}
