//! Argument builders for the external tools aptstage drives.
//!
//! Every invocation runs from [`TOOL_WORKDIR`]; paths passed in are absolute.

use std::path::Path;

pub const APT_KEY: &str = "apt-key";
pub const APT_GET: &str = "apt-get";
pub const DPKG: &str = "dpkg";

pub const TOOL_WORKDIR: &str = "/";

/// `apt-key --keyring <keyring> adv <option>`, the option passed through as one argument.
pub fn apt_key_adv_args(keyring: &Path, option: &str) -> Vec<String> {
    vec![
        "--keyring".to_owned(),
        keyring.to_string_lossy().into_owned(),
        "adv".to_owned(),
        option.to_owned(),
    ]
}

/// `apt-key --keyring <keyring> adv --fetch-keys <url>`
pub fn apt_key_fetch_args(keyring: &Path, url: &str) -> Vec<String> {
    vec![
        "--keyring".to_owned(),
        keyring.to_string_lossy().into_owned(),
        "adv".to_owned(),
        "--fetch-keys".to_owned(),
        url.to_owned(),
    ]
}

/// `apt-get <options> update`
pub fn apt_get_update_args(options: &[String]) -> Vec<String> {
    let mut args = options.to_vec();
    args.push("update".to_owned());
    args
}

/// `apt-get <options> -y --force-yes -d install --reinstall <packages>`
///
/// Downloads into the cache without unpacking, even when a package is
/// already marked installed in the isolated state.
pub fn apt_get_download_args<S: AsRef<str>>(options: &[String], packages: &[S]) -> Vec<String> {
    let mut args = options.to_vec();
    args.extend(
        ["-y", "--force-yes", "-d", "install", "--reinstall"]
            .iter()
            .map(|s| (*s).to_owned()),
    );
    args.extend(packages.iter().map(|p| p.as_ref().to_owned()));
    args
}

/// `dpkg -x <archive> <dest>`
pub fn dpkg_extract_args(archive: &Path, dest: &Path) -> Vec<String> {
    vec![
        "-x".to_owned(),
        archive.to_string_lossy().into_owned(),
        dest.to_string_lossy().into_owned(),
    ]
}
