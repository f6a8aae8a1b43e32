// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block there MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

mod error;
mod host;
mod platform;
mod render;
mod sys;

use crate::host::{ConsoleHost, Host};
use crate::sys::args::CommandLine;
use crate::sys::settings::SysSettings;
use crate::sys::{Startup, System};

fn main() {
    let args = CommandLine::from_env();
    sys::init_logging(&args);
    log::info!("{} {} starting", args.arg(0), env!("CARGO_PKG_VERSION"));

    let settings = SysSettings::load();
    let mut sys = match System::init(args, settings) {
        Ok(Startup::Run(sys)) => sys,
        Ok(Startup::Forwarded) => return,
        Err(e) => sys::fatal_early(&e),
    };

    let mut host = match ConsoleHost::for_system(&sys) {
        Ok(h) => h,
        Err(e) => sys.fatal(&e),
    };

    let result = host::run(&mut sys, &mut host);
    host.shutdown(&mut sys);
    match result {
        Ok(()) => sys.quit(),
        Err(e) => sys.fatal(&e),
    }
}
