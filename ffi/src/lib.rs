//! C-ABI wrapper around `developool-middleware`.
//!
//! # Overview
//! Exposes every Developool operation through `extern "C"` functions so the
//! mobile host can call the middleware without linking against Rust's
//! runtime or serde. Models and the project filter cross the boundary as
//! JSON text; results come back through a C callback.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Each `dp_*` operation returns `true` once the callback has been taken
//!   over. From then on the callback fires exactly once, from a worker
//!   thread, even when an argument could not be decoded. `false` means a null
//!   handle or callback; nothing will fire.
//! - `FfiResult` is borrowed for the duration of the callback only, so the
//!   host never frees anything but the handle from `dp_middleware_new`.

pub mod types;

use std::ffi::c_void;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use developool_core::{ApiError, Profile, Project, ProjectFilter};
use developool_middleware::{Middleware, MiddlewareConfig};

use types::*;

// ---------------------------------------------------------------------------
// Middleware lifecycle
// ---------------------------------------------------------------------------

/// Create a middleware bound to `base_url`.
///
/// A null `base_url` loads the configuration from `developool.toml` and
/// `DEVELOPOOL_*` environment variables instead. Returns null if the
/// configuration or the worker runtime cannot be set up. The caller must
/// free the handle with `dp_middleware_free`.
#[unsafe(no_mangle)]
pub extern "C" fn dp_middleware_new(base_url: *const c_char) -> *mut DpMiddleware {
    catch_unwind(|| {
        let config = if base_url.is_null() {
            match MiddlewareConfig::load() {
                Ok(config) => config,
                Err(_) => return std::ptr::null_mut(),
            }
        } else {
            MiddlewareConfig::new(unsafe { text(base_url) })
        };
        match Middleware::new(config) {
            Ok(inner) => Box::into_raw(Box::new(DpMiddleware { inner })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a middleware created by `dp_middleware_new`. Blocks until running
/// calls have delivered their callbacks; calls still queued may be dropped
/// without one. Safe to call with null; must not be called from inside a
/// callback.
#[unsafe(no_mangle)]
pub extern "C" fn dp_middleware_free(mw: *mut DpMiddleware) {
    if !mw.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(mw) });
        }));
    }
}

/// Hand `callback` to `start`. Decode failures go through the worker pool
/// like any other result.
fn submit<F>(
    mw: *const DpMiddleware,
    callback: DpCallback,
    user_data: *mut c_void,
    start: F,
) -> bool
where
    F: FnOnce(&Middleware, Completion) -> Result<(), ApiError>,
{
    catch_unwind(AssertUnwindSafe(|| {
        let Some(callback) = callback else {
            return false;
        };
        if mw.is_null() {
            return false;
        }
        let middleware = unsafe { &(*mw).inner };
        let done = Completion {
            callback,
            user_data: UserData(user_data),
        };
        if let Err(err) = start(middleware, done) {
            middleware.reject(err, move |r| done.deliver(r));
        }
        true
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Exchange credentials for a session. The body holds the token.
#[unsafe(no_mangle)]
pub extern "C" fn dp_authenticate(
    mw: *const DpMiddleware,
    email: *const c_char,
    password: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let (email, password) = unsafe { (text(email), text(password)) };
        mw.authenticate(&email, &password, move |r| done.deliver(r));
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn dp_register(
    mw: *const DpMiddleware,
    username: *const c_char,
    email: *const c_char,
    password: *const c_char,
    password_confirmation: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let (username, email) = unsafe { (text(username), text(email)) };
        let (password, confirmation) = unsafe { (text(password), text(password_confirmation)) };
        mw.register(&username, &email, &password, &confirmation, move |r| {
            done.deliver(r)
        });
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn dp_get_own_projects(
    mw: *const DpMiddleware,
    token: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let token = unsafe { text(token) };
        mw.get_own_projects(&token, move |r| done.deliver(r));
        Ok(())
    })
}

/// `project_json` is a project object; `title` and `private` are required.
#[unsafe(no_mangle)]
pub extern "C" fn dp_create_new_project(
    mw: *const DpMiddleware,
    token: *const c_char,
    project_json: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let token = unsafe { text(token) };
        let project: Project = unsafe { json(project_json) }?;
        mw.create_new_project(&token, &project, move |r| done.deliver(r));
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn dp_get_project_by_id(
    mw: *const DpMiddleware,
    token: *const c_char,
    project_id: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let (token, project_id) = unsafe { (text(token), text(project_id)) };
        mw.get_project_by_id(&token, &project_id, move |r| done.deliver(r));
        Ok(())
    })
}

/// `filter_json` may be null to list every project.
#[unsafe(no_mangle)]
pub extern "C" fn dp_get_all_projects(
    mw: *const DpMiddleware,
    filter_json: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let filter: Option<ProjectFilter> = unsafe { optional_json(filter_json) }?;
        mw.get_all_projects(filter.as_ref(), move |r| done.deliver(r));
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn dp_update_project(
    mw: *const DpMiddleware,
    token: *const c_char,
    project_id: *const c_char,
    project_json: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let (token, project_id) = unsafe { (text(token), text(project_id)) };
        let project: Project = unsafe { json(project_json) }?;
        mw.update_project(&token, &project_id, &project, move |r| done.deliver(r));
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn dp_delete_project(
    mw: *const DpMiddleware,
    token: *const c_char,
    project_id: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let (token, project_id) = unsafe { (text(token), text(project_id)) };
        mw.delete_project(&token, &project_id, move |r| done.deliver(r));
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn dp_join_project(
    mw: *const DpMiddleware,
    token: *const c_char,
    project_id: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let (token, project_id) = unsafe { (text(token), text(project_id)) };
        mw.join_project(&token, &project_id, move |r| done.deliver(r));
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn dp_leave_project(
    mw: *const DpMiddleware,
    token: *const c_char,
    project_id: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let (token, project_id) = unsafe { (text(token), text(project_id)) };
        mw.leave_project(&token, &project_id, move |r| done.deliver(r));
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn dp_get_own_profile(
    mw: *const DpMiddleware,
    token: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let token = unsafe { text(token) };
        mw.get_own_profile(&token, move |r| done.deliver(r));
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn dp_get_profile_by_account_id(
    mw: *const DpMiddleware,
    account_id: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let account_id = unsafe { text(account_id) };
        mw.get_profile_by_account_id(&account_id, move |r| done.deliver(r));
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn dp_create_own_profile(
    mw: *const DpMiddleware,
    token: *const c_char,
    profile_json: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let token = unsafe { text(token) };
        let profile: Profile = unsafe { json(profile_json) }?;
        mw.create_own_profile(&token, &profile, move |r| done.deliver(r));
        Ok(())
    })
}

/// Fields absent from `profile_json` are left unchanged on the server.
#[unsafe(no_mangle)]
pub extern "C" fn dp_update_own_profile(
    mw: *const DpMiddleware,
    token: *const c_char,
    profile_json: *const c_char,
    callback: DpCallback,
    user_data: *mut c_void,
) -> bool {
    submit(mw, callback, user_data, |mw, done| {
        let token = unsafe { text(token) };
        let profile: Profile = unsafe { json(profile_json) }?;
        mw.update_own_profile(&token, &profile, move |r| done.deliver(r));
        Ok(())
    })
}
