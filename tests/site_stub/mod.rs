use std::sync::mpsc;
use std::thread;
use std::time::Duration;

pub const STORY_PATH: &str = "/story/77-the-lighthouse";

/// Local stand-in for the story site: one story page with two chapters, the
/// chapter pages, the safety classification and the paginated text endpoint.
pub struct SiteStub {
    pub base_url: String,
    shutdown_tx: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

pub struct SiteOptions {
    pub safety_body: &'static str,
    pub list_chapters: bool,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            safety_body: r#"{"classification":1}"#,
            list_chapters: true,
        }
    }
}

impl SiteStub {
    pub fn story_url(&self) -> String {
        format!("{}{STORY_PATH}", self.base_url)
    }
}

impl Drop for SiteStub {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn story_page(list_chapters: bool) -> String {
    let chapters = if list_chapters {
        r#"<li><a href="/1001-arrival">
  <div class="left-container"><div class="part__label"><div class="part-title">Arrival</div></div></div>
  <div class="right-label">Tue, Feb 6, 2024</div>
</a></li>
<li><a href="/1002-the-storm">
  <div class="left-container"><div class="part__label">
    <div class="part-title">The Storm</div>
    <div class="icon-container"><span>New</span></div>
  </div></div>
  <div class="right-label">Locked Mar 1, 2024</div>
</a></li>"#
    } else {
        ""
    };

    format!(
        r#"<!doctype html>
<html>
  <head><title>The Lighthouse</title></head>
  <body>
    <div id="root">
    <div class="story-header">
      <div class="story-cover"><img src="/covers/77.jpg"></div>
      <div class="story-info">
        <div class="author-info"><div class="author-info__username"><a href="/user/keeper">keeper</a></div></div>
        <div class="story-info__title">The Lighthouse</div>
        <ul>
          <li class="stats-item"><span class="sr-only">Reads 1.2M</span></li>
          <li class="stats-item"><span class="sr-only">Votes 45,678</span></li>
          <li class="stats-item"><span class="sr-only">Parts 2</span></li>
          <li class="stats-item"><span class="sr-only">Time 25 minutes</span></li>
        </ul>
      </div>
    </div>
    <div class="story-badges">
      <div class="completed"><div class="tag-item">Complete</div></div>
      <div id="publish-date"><strong>Jan 20, 2024</strong></div>
    </div>
    <a class="card on-navigate" href="/story/77/rankings">#1 in mystery</a>
    <div class="story-parts"><ul>{chapters}</ul></div>
    </div>
  </body>
</html>"#
    )
}

fn chapter_page(reads: &str, votes: &str, comments: &str) -> String {
    format!(
        r##"<!doctype html>
<html>
  <body>
    <div class="story-stats">
      <span class="reads">{reads}</span>
      <span class="votes">{votes}</span>
      <span class="comments"><a href="#comments">{comments}</a></span>
    </div>
  </body>
</html>"##
    )
}

fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

fn story_text(query: &str) -> Option<&'static str> {
    if query_param(query, "m") != Some("storytext") {
        return None;
    }
    match (query_param(query, "id")?, query_param(query, "page")?) {
        ("1001", "0") => Some("<p>The keeper climbed the stairs.</p>\n"),
        ("1001", "1") => Some("<p>The lamp was dark.</p>\n"),
        ("1001", _) => Some(""),
        ("1002", _) => Some(""),
        _ => None,
    }
}

pub fn spawn_site(options: SiteOptions) -> SiteStub {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("start tiny_http server");
    let addr = server.server_addr();
    let base_url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            let request = match server.recv_timeout(Duration::from_millis(50)) {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(_) => break,
            };

            let url = request.url().to_string();
            let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));

            let body = match path {
                STORY_PATH => Some(story_page(options.list_chapters)),
                "/1001-arrival" => Some(chapter_page("2.5K", "310", "12")),
                "/1002-the-storm" => Some(chapter_page("900", "41", "0")),
                "/v5/stories/77/classification/safety" => Some(options.safety_body.to_owned()),
                "/apiv2/" => story_text(query).map(str::to_owned),
                _ => None,
            };

            let response = match body {
                Some(body) => tiny_http::Response::from_string(body).with_status_code(200),
                None => tiny_http::Response::from_string("not found").with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });

    SiteStub {
        base_url,
        shutdown_tx,
        handle: Some(handle),
    }
}
