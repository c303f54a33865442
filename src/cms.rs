//! Article content from the headless CMS.
//!
//! Every failure is logged and degrades to empty content so pages still render.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate};
use pulldown_cmark::{Event, Options, Parser};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

const DEFAULT_BASE_URL: &str = "http://localhost:1337";

/// A published blog article.
#[derive(Clone, Debug, PartialEq)]
pub struct Article {
	/// CMS record id.
	pub id: u64,
	/// Headline.
	pub title: String,
	/// URL segment under `/blog/`.
	pub slug: String,
	/// Byline, empty when the CMS has none.
	pub author: String,
	/// Publication timestamp as sent by the CMS (RFC 3339).
	pub published_at: String,
	/// Teaser shown in the list and as the page description.
	pub excerpt: String,
	/// Body in Markdown.
	pub content: String,
}

impl Article {
	/// Publication date as `Month d, yyyy`, or the raw value when it is not
	/// a valid RFC 3339 timestamp or `yyyy-mm-dd` date.
	pub fn published_on(&self) -> String {
		format_date(&self.published_at).unwrap_or_else(|| self.published_at.clone())
	}

	/// Body rendered from Markdown to HTML. Raw HTML in the source is escaped.
	pub fn content_html(&self) -> String {
		render_markdown(&self.content)
	}
}

#[derive(Deserialize)]
struct Envelope {
	#[serde(default)]
	data: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
	id: u64,
	attributes: Attributes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Attributes {
	title: String,
	slug: String,
	#[serde(default)]
	author: String,
	#[serde(default)]
	published_at: Option<String>,
	#[serde(default)]
	excerpt: String,
	#[serde(default)]
	content: String,
}

impl From<Entry> for Article {
	fn from(entry: Entry) -> Self {
		let a = entry.attributes;
		Self {
			id: entry.id,
			title: a.title,
			slug: a.slug,
			author: a.author,
			published_at: a.published_at.unwrap_or_default(),
			excerpt: a.excerpt,
			content: a.content,
		}
	}
}

/// Parses a collection response body.
pub fn parse_articles(body: &str) -> Result<Vec<Article>> {
	let envelope: Envelope = serde_json::from_str(body).context("malformed article response")?;
	Ok(envelope.data.into_iter().map(Article::from).collect())
}

/// Client for the article endpoints.
#[derive(Clone, Debug)]
pub struct CmsClient {
	base_url: String,
}

impl Default for CmsClient {
	fn default() -> Self {
		Self::from_env()
	}
}

impl CmsClient {
	/// Uses `CMS_API_URL` from the build environment, falling back to a
	/// local server.
	pub fn from_env() -> Self {
		Self::new(option_env!("CMS_API_URL").unwrap_or(DEFAULT_BASE_URL))
	}

	/// Client rooted at `base_url`.
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url: String = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	/// URL of the article collection.
	pub fn articles_url(&self) -> String {
		format!("{}/api/articles", self.base_url)
	}

	/// URL of the collection filtered to `slug`.
	pub fn article_url(&self, slug: &str) -> String {
		let slug = String::from(js_sys::encode_uri_component(slug));
		format!("{}/api/articles?filters[slug][$eq]={slug}", self.base_url)
	}

	/// All articles. Empty when the CMS cannot be reached.
	pub async fn articles(&self) -> Vec<Article> {
		match self.fetch(&self.articles_url()).await {
			Ok(articles) => articles,
			Err(err) => {
				log::error!(target: "cms", "failed to fetch articles: {err:#}");
				Vec::new()
			}
		}
	}

	/// The article with `slug`, if any.
	pub async fn article_by_slug(&self, slug: &str) -> Option<Article> {
		match self.fetch(&self.article_url(slug)).await {
			Ok(articles) => articles.into_iter().next(),
			Err(err) => {
				log::error!(target: "cms", "failed to fetch article {slug}: {err:#}");
				None
			}
		}
	}

	async fn fetch(&self, url: &str) -> Result<Vec<Article>> {
		let window = web_sys::window().context("no window")?;
		let response: Response = JsFuture::from(window.fetch_with_str(url))
			.await
			.map_err(|e| anyhow!("request to {url} failed: {e:?}"))?
			.dyn_into()
			.map_err(|_| anyhow!("fetch did not return a Response"))?;
		if !response.ok() {
			bail!("{url} answered {} {}", response.status(), response.status_text());
		}
		let text = response.text().map_err(|e| anyhow!("{e:?}"))?;
		let body = JsFuture::from(text)
			.await
			.map_err(|e| anyhow!("reading body: {e:?}"))?
			.as_string()
			.context("body is not text")?;
		log::debug!(target: "cms", "{url}: {} bytes", body.len());
		parse_articles(&body)
	}
}

fn format_date(value: &str) -> Option<String> {
	let date = DateTime::parse_from_rfc3339(value)
		.map(|stamp| stamp.date_naive())
		.or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
		.ok()?;
	Some(date.format("%B %-d, %Y").to_string())
}

fn render_markdown(source: &str) -> String {
	let options =
		Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
	let events = Parser::new_ext(source, options).map(|event| match event {
		Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
		other => other,
	});
	let mut html = String::with_capacity(source.len() * 3 / 2);
	pulldown_cmark::html::push_html(&mut html, events);
	html
}
