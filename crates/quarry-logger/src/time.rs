use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current local time in the format YYYY-MM-DD HH:MM:SS TZ
#[cfg(unix)]
pub fn now() -> String {
    use std::ffi::CStr;

    let secs = unix_timestamp() as libc::time_t;
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    let mut buf = [0 as libc::c_char; 100];

    unsafe {
        if libc::localtime_r(&secs, &mut tm).is_null() {
            return secs.to_string();
        }
        let written = libc::strftime(
            buf.as_mut_ptr(),
            buf.len(),
            c"%Y-%m-%d %H:%M:%S %Z".as_ptr(),
            &tm,
        );
        if written == 0 {
            return secs.to_string();
        }
        CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
    }
}

/// Returns the current local time in the format YYYY-MM-DD HH:MM:SS
#[cfg(windows)]
pub fn now() -> String {
    use windows_sys::Win32::Foundation::SYSTEMTIME;
    use windows_sys::Win32::System::SystemInformation::GetLocalTime;

    let mut tm: SYSTEMTIME = unsafe { std::mem::zeroed() };
    unsafe {
        GetLocalTime(&mut tm);
    }

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        tm.wYear, tm.wMonth, tm.wDay, tm.wHour, tm.wMinute, tm.wSecond
    )
}

#[cfg(not(any(unix, windows)))]
pub fn now() -> String {
    unix_timestamp().to_string()
}

/// Returns the current Unix timestamp in seconds
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
