//! Batch uploader behind `vimscriptuploader`
//!
//! Logs in once, publishes every descriptor in turn, and logs out on every way out of
//! the loop. A bad descriptor is reported and skipped; transport errors abort the
//! batch after logout.

use crate::core::config::UploadConfig;
use crate::core::error::{ConfigError, ReleaseResult};
use crate::core::logging::LogContext;
use crate::release::descriptor::ReleaseDescriptor;
use crate::upload::site::{SiteClient, UploadRequest, upload_url};
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::path::Path;

/// Outcome of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
  pub published: usize,
  pub failed: usize,
}

pub struct Uploader<C: SiteClient> {
  config: UploadConfig,
  client: C,
  logged_in: bool,
  log: LogContext,
}

/// Logs out when dropped unless [`LogoutGuard::finish`] already did
struct LogoutGuard<'a, C: SiteClient> {
  uploader: &'a mut Uploader<C>,
  armed: bool,
}

impl<'a, C: SiteClient> LogoutGuard<'a, C> {
  fn new(uploader: &'a mut Uploader<C>) -> Self {
    Self { uploader, armed: true }
  }

  fn finish(mut self) -> ReleaseResult<()> {
    self.armed = false;
    self.uploader.logout()
  }
}

impl<C: SiteClient> Deref for LogoutGuard<'_, C> {
  type Target = Uploader<C>;

  fn deref(&self) -> &Self::Target {
    self.uploader
  }
}

impl<C: SiteClient> DerefMut for LogoutGuard<'_, C> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    self.uploader
  }
}

impl<C: SiteClient> Drop for LogoutGuard<'_, C> {
  fn drop(&mut self) {
    if self.armed
      && let Err(err) = self.uploader.logout()
    {
      tracing::error!("Logout failed: {}", err);
    }
  }
}

impl<C: SiteClient> Uploader<C> {
  pub fn new(config: UploadConfig, client: C, log: LogContext) -> Self {
    Self {
      config,
      client,
      logged_in: false,
      log,
    }
  }

  pub fn client(&self) -> &C {
    &self.client
  }

  pub fn is_logged_in(&self) -> bool {
    self.logged_in
  }

  /// Publish every descriptor file; dry-run output goes to `out`
  pub fn process<P: AsRef<Path>>(&mut self, descriptors: &[P], out: &mut dyn Write) -> ReleaseResult<UploadReport> {
    let span = self.log.span("upload");
    let _enter = span.enter();

    self.login()?;

    let mut report = UploadReport::default();
    let mut session = LogoutGuard::new(self);
    for path in descriptors {
      if session.upload_file(path.as_ref(), out)? {
        report.published += 1;
      } else {
        report.failed += 1;
      }
    }
    session.finish()?;

    tracing::info!("{} published, {} failed", report.published, report.failed);
    Ok(report)
  }

  /// Log in unless already logged in; missing credentials are fatal
  pub fn login(&mut self) -> ReleaseResult<()> {
    if self.logged_in {
      return Ok(());
    }
    let (user, password) = self.config.credentials().ok_or(ConfigError::MissingCredentials)?;
    if self.config.dry {
      tracing::warn!("Login: {}:*********", user);
      return Ok(());
    }
    let (user, password) = (user.to_string(), password.to_string());
    self.client.login(&user, &password)?;
    self.logged_in = true;
    Ok(())
  }

  pub fn logout(&mut self) -> ReleaseResult<()> {
    if self.config.dry {
      tracing::warn!("Log out");
    } else {
      self.client.logout()?;
    }
    self.logged_in = false;
    Ok(())
  }

  /// Load one descriptor file, fill gaps from the config, and upload it
  pub fn upload_file(&mut self, path: &Path, out: &mut dyn Write) -> ReleaseResult<bool> {
    if !path.is_file() {
      tracing::error!("YAML script definition not found: {}", path.display());
      return Ok(false);
    }
    let descriptor = match ReleaseDescriptor::load(path) {
      Ok(descriptor) => descriptor,
      Err(err) => {
        tracing::error!("{}", err);
        return Ok(false);
      }
    };
    let descriptor = descriptor.or_defaults(&self.config.defaults());
    self.upload(&descriptor, out)
  }

  /// Upload one descriptor; `Ok(false)` when it was skipped
  pub fn upload(&mut self, descriptor: &ReleaseDescriptor, out: &mut dyn Write) -> ReleaseResult<bool> {
    let Some(script_id) = descriptor.numeric_id() else {
      tracing::error!("No valid script ID: {:?}", descriptor.id);
      return Ok(false);
    };
    if let Err(err) = descriptor.ensure_complete() {
      tracing::error!("{}", err);
      return Ok(false);
    }

    tracing::warn!("Upload URL: {}", upload_url(&self.config.site, script_id));

    if self.config.dry {
      descriptor.write_to(out)?;
      return Ok(true);
    }

    let (version, message, file) = match (&descriptor.version, &descriptor.message, &descriptor.file) {
      (Some(version), Some(message), Some(file)) => (version, message, file),
      _ => return Ok(false),
    };
    let file = Path::new(file);
    if !file.is_file() {
      tracing::error!("Plugin file does not exist: {}", file.display());
      return Ok(false);
    }

    self.client.upload(&UploadRequest {
      script_id,
      version,
      message,
      file,
    })?;
    Ok(true)
  }
}
