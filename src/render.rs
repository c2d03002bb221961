//! Typed-markdown rendering
//!
//! Responses are revealed a few characters at a time: every frame renders a
//! growing prefix of the markdown source to HTML and hands it to a
//! [`RenderTarget`]. A final frame always carries the full text, so the
//! animated path and [`Renderer::render_now`] leave a target in the same
//! state.

use crate::config::RenderConfig;
use pulldown_cmark::{html, Options, Parser};
use std::io::Write;
use std::time::Duration;

/// One rendered step of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame<'a> {
    /// Markdown prefix this frame was rendered from
    pub source: &'a str,
    /// HTML rendering of `source`
    pub html: String,
    /// Whether `source` is the full text
    pub complete: bool,
}

/// Something that displays rendered frames
pub trait RenderTarget {
    fn render(&mut self, frame: &RenderFrame<'_>);
}

/// Render markdown to HTML
///
/// # Examples
///
/// ```
/// use studyqa::render::markdown_to_html;
///
/// assert_eq!(markdown_to_html("**4**"), "<p><strong>4</strong></p>\n");
/// ```
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Typed-markdown renderer
#[derive(Debug, Clone)]
pub struct Renderer {
    step: usize,
    delay: Duration,
    animate: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            step: config.step.max(1),
            delay: Duration::from_millis(config.delay_ms),
            animate: config.animate,
        }
    }

    /// Renderer that never animates
    pub fn immediate() -> Self {
        Self {
            animate: false,
            ..Self::default()
        }
    }

    /// Reveal `text` progressively, then render it in full
    ///
    /// Falls back to [`Renderer::render_now`] when animation is disabled.
    pub async fn render_typed(&self, text: &str, target: &mut dyn RenderTarget) {
        if !self.animate {
            self.render_now(text, target);
            return;
        }

        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(idx, _)| idx)
            .skip(self.step)
            .step_by(self.step)
            .collect();

        for end in boundaries {
            let source = &text[..end];
            target.render(&RenderFrame {
                source,
                html: markdown_to_html(source),
                complete: false,
            });
            tokio::time::sleep(self.delay).await;
        }

        self.render_now(text, target);
    }

    /// Render the full text in one frame
    pub fn render_now(&self, text: &str, target: &mut dyn RenderTarget) {
        target.render(&RenderFrame {
            source: text,
            html: markdown_to_html(text),
            complete: true,
        });
    }
}

/// Target that keeps the latest HTML in memory
#[derive(Debug, Default, Clone)]
pub struct HtmlBuffer {
    pub html: String,
    pub frames: usize,
}

impl RenderTarget for HtmlBuffer {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        self.html = frame.html.clone();
        self.frames += 1;
    }
}

/// Target that types the markdown source onto the terminal
///
/// Each frame prints only the characters not yet shown.
#[derive(Debug, Default)]
pub struct TerminalTarget {
    shown: usize,
}

impl TerminalTarget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderTarget for TerminalTarget {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        let mut stdout = std::io::stdout().lock();
        if let Some(rest) = frame.source.get(self.shown..) {
            let _ = stdout.write_all(rest.as_bytes());
        }
        self.shown = frame.source.len();
        if frame.complete {
            let _ = stdout.write_all(b"\n");
            self.shown = 0;
        }
        let _ = stdout.flush();
    }
}
