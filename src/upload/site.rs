//! Talking to www.vim.org
//!
//! The uploader only sees [`SiteClient`]. [`VimOrgClient`] drives the real site the
//! way a browser would: fetch a page, fill its form, submit it, with cookies kept
//! between requests.

use crate::core::error::{FormError, ReleaseError, ReleaseResult, ResultExt};
use crate::upload::form::HtmlForm;
use reqwest::Url;
use reqwest::blocking::{Client, ClientBuilder, RequestBuilder, Response};
use std::path::Path;

pub const USER_AGENT: &str = concat!("vimscriptuploader/", env!("CARGO_PKG_VERSION"));

const LOGIN_PATH: &str = "/login.php";
const LOGOUT_PATH: &str = "/logout.php";

/// Page with the "upload new version" form for a script
pub fn upload_url(site: &str, script_id: u64) -> String {
  format!(
    "{}/scripts/add_script_version.php?script_id={}",
    site.trim_end_matches('/'),
    script_id
  )
}

/// One version to publish
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
  pub script_id: u64,
  pub version: &'a str,
  pub message: &'a str,
  pub file: &'a Path,
}

/// Authenticated session with the plugin site
pub trait SiteClient {
  fn login(&mut self, username: &str, password: &str) -> ReleaseResult<()>;

  fn logout(&mut self) -> ReleaseResult<()>;

  fn upload(&mut self, request: &UploadRequest<'_>) -> ReleaseResult<()>;
}

pub struct VimOrgClient {
  client: Client,
  site: String,
}

impl VimOrgClient {
  pub fn new(site: &str) -> ReleaseResult<Self> {
    Self::with_builder(site, Client::builder())
  }

  fn with_builder(site: &str, builder: ClientBuilder) -> ReleaseResult<Self> {
    let client = builder
      .cookie_store(true)
      .user_agent(USER_AGENT)
      .build()
      .context("Failed to build HTTP client")?;
    Ok(Self {
      client,
      site: site.trim_end_matches('/').to_string(),
    })
  }

  fn url(&self, path: &str) -> ReleaseResult<Url> {
    let raw = format!("{}{}", self.site, path);
    Url::parse(&raw).map_err(|e| ReleaseError::with_help(format!("Invalid site URL {}: {}", raw, e), "Check `site`."))
  }

  /// GET a page, returning its final URL and body
  fn get(&self, url: Url) -> ReleaseResult<(Url, String)> {
    let response = self.client.get(url).send()?.error_for_status()?;
    let final_url = response.url().clone();
    let body = response.text()?;
    Ok((final_url, body))
  }

  fn fetch_form(&self, url: Url, name: &str, method: Option<&str>) -> ReleaseResult<HtmlForm> {
    let (page_url, body) = self.get(url)?;
    let form = HtmlForm::find(&body, &page_url, name, method)?;
    tracing::debug!("Form: {:?}", form);
    Ok(form)
  }

  fn request(&self, form: &HtmlForm) -> RequestBuilder {
    if form.method == "POST" {
      self.client.post(form.action.clone())
    } else {
      self.client.get(form.action.clone())
    }
  }

  fn finish(response: Response, what: &str) -> ReleaseResult<()> {
    let body = response.error_for_status()?.text()?;
    tracing::debug!("{} result: {}", what, body);
    Ok(())
  }
}

impl SiteClient for VimOrgClient {
  fn login(&mut self, username: &str, password: &str) -> ReleaseResult<()> {
    let mut form = self.fetch_form(self.url(LOGIN_PATH)?, "login", None)?;
    form.set("userName", username)?;
    form.set("password", password)?;

    let pairs = form.pairs();
    let request = if form.method == "POST" {
      self.request(&form).form(&pairs)
    } else {
      self.request(&form).query(&pairs)
    };
    // The response is not inspected; a rejected login surfaces on upload.
    Self::finish(request.send()?, "Login")
  }

  fn logout(&mut self) -> ReleaseResult<()> {
    let (_, body) = self.get(self.url(LOGOUT_PATH)?)?;
    tracing::debug!("Logout result: {}", body);
    Ok(())
  }

  fn upload(&mut self, request: &UploadRequest<'_>) -> ReleaseResult<()> {
    let url = Url::parse(&upload_url(&self.site, request.script_id))
      .map_err(|e| ReleaseError::message(format!("Invalid upload URL: {}", e)))?;
    let mut form = self.fetch_form(url, "script", Some("POST"))?;
    form.set("script_version", request.version)?;
    form.set("version_comment", request.message)?;

    let file_field = form
      .first_file_input()
      .ok_or_else(|| FormError::NoFileInput { form: form.name.clone() })?
      .to_string();
    let body = form
      .multipart(&file_field, request.file)
      .with_context(|| format!("Failed to attach {}", request.file.display()))?;

    Self::finish(self.request(&form).multipart(body).send()?, "Upload")
  }
}
