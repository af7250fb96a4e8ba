//! The document being assembled: global options, default page options and
//! the ordered list of pages, covers and tables of contents.

use crate::args::{Arg, Entry, OptionSet, Value, render};
use crate::command::{Command, CommandResult, Status};
use crate::error::{ErrorKind, Result};
use crate::input::{Input, InputResolver, ResolvedInput};
use crate::kind::OutputKind;
use crate::response::Response;
use crate::settings::Settings;
use crate::tmp::TempFile;
use std::io::Write;
use std::path::Path;
use tracing::instrument;

/// The kind of a renderable object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Page,
    Cover,
    Toc,
}

#[derive(Debug)]
struct Object {
    kind: ObjectKind,
    options: OptionSet,
    input: Option<ResolvedInput>,
    // Raw header/footer/stylesheet content written out for this object.
    tmp_files: Vec<TempFile>,
}
impl Object {
    fn args(&self, legacy_syntax: bool) -> Vec<Arg> {
        let mut args = render(&self.options);
        let marker = match self.kind {
            ObjectKind::Page => None,
            ObjectKind::Cover => Some("cover"),
            ObjectKind::Toc => Some("toc"),
        };
        if let Some(marker) = marker {
            args.push(Arg::literal(match legacy_syntax {
                true => format!("--{marker}"),
                false => marker.to_string(),
            }));
        }
        if let Some(input) = &self.input {
            args.push(Arg::value(input.token()));
        }
        args
    }

    fn release(&mut self) -> Result<()> {
        let mut result = Ok(());
        if let Some(ResolvedInput::Temp(tmp)) = &mut self.input {
            result = result.and(tmp.release());
        }
        for tmp in &mut self.tmp_files {
            result = result.and(tmp.release());
        }
        result
    }
}

/// A document to be rendered by wkhtmltopdf or wkhtmltoimage.
///
/// Rendering is single-shot: the first call to [`render`](Self::render) (or
/// to any method that needs the output) runs the renderer; the outcome is
/// kept and never recomputed. Temporary files created for inline content
/// live exactly as long as the document.
///
/// ```no_run
/// use htmlto_render::{Document, OptionSet, OutputKind};
///
/// let mut document = Document::new(OutputKind::Pdf);
/// document
///     .set_options(OptionSet::new().flag("no-outline").set("margin-top", 0))?
///     .add_cover("<html><h1>Annual Report</h1></html>", OptionSet::new())?
///     .add_toc(OptionSet::new())?
///     .add_page("https://example.com/report", OptionSet::new())?;
/// document.save_as("/tmp/report.pdf")?;
/// # Ok::<(), htmlto_render::error::Error>(())
/// ```
#[derive(Debug)]
pub struct Document {
    kind: OutputKind,
    settings: Settings,
    options: OptionSet,
    page_options: OptionSet,
    objects: Vec<Object>,
    // Owned by the document itself: content from global and default page options.
    tmp_files: Vec<TempFile>,
    output: Option<TempFile>,
    result: Option<CommandResult>,
}
impl Document {
    pub fn new(kind: OutputKind) -> Self {
        Self::with_settings(kind, Settings::default())
    }

    pub fn with_settings(kind: OutputKind, settings: Settings) -> Self {
        Self {
            kind,
            settings,
            options: OptionSet::new(),
            page_options: OptionSet::new(),
            objects: Vec::new(),
            tmp_files: Vec::new(),
            output: None,
            result: None,
        }
    }

    pub fn pdf() -> Self {
        Self::new(OutputKind::Pdf)
    }

    pub fn image() -> Self {
        Self::new(OutputKind::Image)
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Global renderer options, after settings were taken out.
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn page_options(&self) -> &OptionSet {
        &self.page_options
    }

    /// Kinds of the objects added so far, in document order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectKind> + '_ {
        self.objects.iter().map(|o| o.kind)
    }

    /// Merges options into the global options. Settings keys (see
    /// [`Settings::split`]) update the settings instead.
    pub fn set_options(&mut self, options: OptionSet) -> Result<&mut Self> {
        let (settings, mut options) = self.settings.clone().split(options)?;
        self.settings = settings;
        let tmp_files = resolve_options(&self.resolver(), &mut options)?;
        self.tmp_files.extend(tmp_files);
        self.options.merge(options);
        Ok(self)
    }

    /// Replaces the default options merged into pages and covers added from
    /// now on. Objects that were already added keep their options.
    pub fn set_page_options(&mut self, options: OptionSet) -> Result<&mut Self> {
        let mut options = options;
        let tmp_files = resolve_options(&self.resolver(), &mut options)?;
        self.tmp_files.extend(tmp_files);
        self.page_options = options;
        Ok(self)
    }

    /// Adds a page from a URL, a file, or inline HTML/XML.
    pub fn add_page(&mut self, input: impl Into<Input>, options: OptionSet) -> Result<&mut Self> {
        let options = OptionSet::merged(&self.page_options, options);
        self.push(ObjectKind::Page, Some(input.into()), options)
    }

    /// Adds a cover page. Covers get the default page options too.
    pub fn add_cover(&mut self, input: impl Into<Input>, options: OptionSet) -> Result<&mut Self> {
        let options = OptionSet::merged(&self.page_options, options);
        self.push(ObjectKind::Cover, Some(input.into()), options)
    }

    /// Adds a table of contents.
    pub fn add_toc(&mut self, options: OptionSet) -> Result<&mut Self> {
        self.push(ObjectKind::Toc, None, options)
    }

    fn push(&mut self, kind: ObjectKind, input: Option<Input>, mut options: OptionSet) -> Result<&mut Self> {
        let resolver = self.resolver();
        let tmp_files = resolve_options(&resolver, &mut options)?;
        let input = input.map(|input| resolver.resolve(input)).transpose()?;
        tracing::debug!(kind = ?kind, input = ?input.as_ref().map(ResolvedInput::token), "Added object");
        self.objects.push(Object { kind, options, input, tmp_files });
        Ok(self)
    }

    fn resolver(&self) -> InputResolver<'_> {
        InputResolver::new(self.settings.tmp_dir.as_deref())
    }

    fn output_file(&mut self) -> Result<&TempFile> {
        let output = match self.output.take() {
            Some(output) => output,
            None => TempFile::empty(self.kind.suffix(), self.settings.tmp_dir.as_deref())?,
        };
        Ok(self.output.insert(output))
    }

    /// Path of the (temporary) output file. Creates it, empty, if needed.
    pub fn output_path(&mut self) -> Result<&Path> {
        Ok(self.output_file()?.path())
    }

    /// Assembles the full command:
    /// `[binary] [global args] [object args, object input]... [output]`.
    pub fn command(&mut self) -> Result<Command> {
        let output = self.output_file()?.path().to_string_lossy().into_owned();
        let mut command = Command::from_settings(self.kind, &self.settings);
        command.args(render(&self.options));
        for object in &self.objects {
            command.args(object.args(self.settings.legacy_syntax));
        }
        command.arg(Arg::value(output));
        Ok(command)
    }

    /// The command line as it would be run, for diagnostics.
    pub fn command_line(&mut self) -> Result<String> {
        Ok(self.command()?.to_string())
    }

    /// Runs the renderer. Only the first call does anything; later calls fail
    /// with [`AlreadyRendered`](ErrorKind::AlreadyRendered) and leave the
    /// stored result untouched.
    #[instrument(skip_all, fields(kind = ?self.kind, objects = self.objects.len()))]
    pub fn render(&mut self) -> Result<CommandResult> {
        if self.result.is_some() {
            exn::bail!(ErrorKind::AlreadyRendered);
        }
        let command = self.command()?;
        let output = self.output_file()?.path().to_path_buf();
        let result = command.execute(&output, self.settings.ignore_warnings);
        self.result = Some(result.clone());
        Ok(result)
    }

    /// Outcome of the render, if it has run.
    pub fn result(&self) -> Option<&CommandResult> {
        self.result.as_ref()
    }

    pub fn is_rendered(&self) -> bool {
        self.result.is_some()
    }

    /// The failure message of the render, if it failed.
    pub fn error(&self) -> Option<String> {
        self.result.as_ref().and_then(CommandResult::error)
    }

    /// Renderer diagnostics of a render accepted despite warnings.
    pub fn warnings(&self) -> Option<&str> {
        self.result.as_ref().and_then(CommandResult::warnings)
    }

    /// Renders if that has not happened yet, and fails unless the output is
    /// usable.
    fn rendered(&mut self) -> Result<Status> {
        if self.result.is_none() {
            self.render()?;
        }
        match &self.result {
            Some(result) => match result.error() {
                Some(message) => exn::bail!(ErrorKind::RenderFailed(message)),
                None => Ok(result.status()),
            },
            None => exn::bail!(ErrorKind::AlreadyRendered),
        }
    }

    /// Renders (if needed) and copies the output to `destination`.
    pub fn save_as(&mut self, destination: impl AsRef<Path>) -> Result<Status> {
        let destination = destination.as_ref();
        let status = self.rendered()?;
        let bytes = self.output_file()?.save_as(destination)?;
        tracing::debug!(path = %destination.display(), bytes, "Saved rendered output");
        Ok(status)
    }

    /// Renders (if needed) and returns the output bytes.
    pub fn contents(&mut self) -> Result<Vec<u8>> {
        self.rendered()?;
        self.output_file()?.read()
    }

    /// A response preset with this document's content type.
    pub fn response(&self) -> Response {
        Response::new(self.kind.content_type())
    }

    /// Renders (if needed) and writes a CGI-style response to `writer`.
    /// Without a filename (and not inline) no disposition is sent.
    pub fn send(&mut self, writer: &mut impl Write, filename: Option<&str>, inline: bool) -> Result<u64> {
        let mut response = self.response().inline(inline);
        if let Some(filename) = filename {
            response = response.filename(filename);
        }
        self.send_with(&response, writer)
    }

    pub fn send_with(&mut self, response: &Response, writer: &mut impl Write) -> Result<u64> {
        self.rendered()?;
        let output = self.output_file()?;
        response.send(output.path(), writer)
    }

    /// Deletes every temporary file now rather than when dropped, reporting
    /// the first failure.
    pub fn close(mut self) -> Result<()> {
        let mut result = Ok(());
        for object in &mut self.objects {
            result = result.and(object.release());
        }
        for tmp in self.tmp_files.iter_mut().chain(self.output.as_mut()) {
            result = result.and(tmp.release());
        }
        result
    }
}

/// Writes raw content given to header/footer/stylesheet options to temporary
/// files, replacing the option value with the file's path.
fn resolve_options(resolver: &InputResolver<'_>, options: &mut OptionSet) -> Result<Vec<TempFile>> {
    let mut tmp_files = Vec::new();
    for entry in options.iter_mut() {
        if let Entry::Named(name, Value::Scalar(value)) = entry
            && let Some(tmp) = resolver.resolve_option(name, value)?
        {
            *value = tmp.path().to_string_lossy().into_owned();
            tmp_files.push(tmp);
        }
    }
    Ok(tmp_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(unix)]
    use crate::testutil::{Launcher, Renderer};
    use std::fs;
    use std::path::PathBuf;

    const BINARY: &str = "/usr/local/bin/wkhtmltopdf";

    fn document() -> Document {
        let settings = Settings { binary: Some(PathBuf::from(BINARY)), ..Settings::default() };
        Document::with_settings(OutputKind::Pdf, settings)
    }

    fn argv(document: &mut Document) -> Vec<String> {
        let command = document.command().unwrap();
        command.argv().into_iter().map(|s| s.into_string().unwrap()).collect()
    }

    fn output(document: &mut Document) -> String {
        document.output_path().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn global_options_then_page_then_output() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("a.html");
        fs::write(&page, "<html></html>").unwrap();
        let page = page.to_string_lossy().into_owned();

        let mut document = document();
        document.set_options(OptionSet::new().flag("no-outline").set("margin-top", 0)).unwrap();
        document.add_page(page.as_str(), OptionSet::new()).unwrap();
        let output = output(&mut document);
        assert_eq!(argv(&mut document), [BINARY, "--no-outline", "--margin-top", "0", page.as_str(), output.as_str()]);
    }

    #[test]
    fn list_options_repeat_the_flag() {
        let mut document = document();
        document
            .set_options(OptionSet::new().flag("no-outline").set("margin-top", 0).set("allow", ["/tmp", "/test"]))
            .unwrap();
        document.add_page("http://www.example.com/robots.txt", OptionSet::new()).unwrap();
        let output = output(&mut document);
        assert_eq!(
            argv(&mut document),
            [
                BINARY,
                "--no-outline",
                "--margin-top",
                "0",
                "--allow",
                "/tmp",
                "--allow",
                "/test",
                "http://www.example.com/robots.txt",
                output.as_str()
            ]
        );
    }

    #[test]
    fn cover_before_page_with_marker_first() {
        let mut document = document();
        document.add_cover("<html><h1>Cover</h1></html>", OptionSet::new()).unwrap();
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        assert_eq!(document.objects().collect::<Vec<_>>(), [ObjectKind::Cover, ObjectKind::Page]);

        let args = argv(&mut document);
        assert_eq!(args[1], "cover");
        assert!(args[2].ends_with(".html"), "{}", args[2]);
        assert_eq!(fs::read_to_string(&args[2]).unwrap(), "<html><h1>Cover</h1></html>");
        assert_eq!(args[3], "https://example.com/");
        assert_eq!(args.len(), 5);
    }

    #[test]
    fn toc_has_marker_only() {
        let mut document = document();
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        document.add_toc(OptionSet::new().flag("disable-dotted-lines")).unwrap();
        let output = output(&mut document);
        assert_eq!(
            argv(&mut document),
            [BINARY, "https://example.com/", "--disable-dotted-lines", "toc", output.as_str()]
        );
    }

    #[test]
    fn legacy_syntax_prefixes_markers() {
        let mut document = document();
        document.set_options(OptionSet::new().set("version9", "1")).unwrap();
        document.add_cover("https://example.com/cover", OptionSet::new()).unwrap();
        document.add_toc(OptionSet::new()).unwrap();
        let args = argv(&mut document);
        assert_eq!(&args[1..4], ["--cover", "https://example.com/cover", "--toc"]);
    }

    #[test]
    fn object_options_precede_input() {
        let mut document = document();
        document.add_page("https://example.com/", OptionSet::new().set("zoom", 1.5)).unwrap();
        let args = argv(&mut document);
        assert_eq!(&args[1..4], ["--zoom", "1.5", "https://example.com/"]);
    }

    #[test]
    fn page_options_are_defaults() {
        let mut document = document();
        document.add_page("https://example.com/before", OptionSet::new()).unwrap();
        document.set_page_options(OptionSet::new().set("zoom", 2).flag("no-background")).unwrap();
        document.add_page("https://example.com/after", OptionSet::new().set("zoom", 3)).unwrap();
        document.add_cover("https://example.com/cover", OptionSet::new()).unwrap();
        document.add_toc(OptionSet::new()).unwrap();
        let output = output(&mut document);
        assert_eq!(
            argv(&mut document),
            [
                BINARY,
                "https://example.com/before",
                "--zoom",
                "3",
                "--no-background",
                "https://example.com/after",
                "--zoom",
                "2",
                "--no-background",
                "cover",
                "https://example.com/cover",
                "toc",
                output.as_str(),
            ]
        );
    }

    #[test]
    fn settings_are_not_passed_to_renderer() {
        let mut document = Document::pdf();
        document
            .set_options(
                OptionSet::new()
                    .set("binary", BINARY)
                    .set("ignore_warnings", "true")
                    .set("tmp_dir", std::env::temp_dir().to_string_lossy().into_owned())
                    .flag("grayscale"),
            )
            .unwrap();
        assert!(document.settings().ignore_warnings);
        assert_eq!(document.options(), &OptionSet::new().flag("grayscale"));
        let output = output(&mut document);
        assert_eq!(argv(&mut document), [BINARY, "--grayscale", output.as_str()]);
    }

    #[test]
    fn global_options_accumulate_across_calls() {
        let mut document = document();
        document.set_options(OptionSet::new().set("margin-top", 10).flag("quiet")).unwrap();
        document.set_options(OptionSet::new().set("margin-bottom", 5).set("margin-top", 0)).unwrap();
        let args = argv(&mut document);
        assert_eq!(&args[1..6], ["--margin-top", "0", "--quiet", "--margin-bottom", "5"]);
    }

    #[test]
    fn header_html_content_becomes_file() {
        let mut document = document();
        document
            .add_page(
                "https://example.com/",
                OptionSet::new().set("header-html", "<html><body>Header</body></html>"),
            )
            .unwrap();
        let args = argv(&mut document);
        assert_eq!(args[1], "--header-html");
        assert!(args[2].ends_with(".html"));
        assert_eq!(fs::read_to_string(&args[2]).unwrap(), "<html><body>Header</body></html>");
    }

    #[test]
    fn header_html_url_is_kept() {
        let mut document = document();
        document.set_page_options(OptionSet::new().set("footer-html", "https://example.com/footer")).unwrap();
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let args = argv(&mut document);
        assert_eq!(&args[1..3], ["--footer-html", "https://example.com/footer"]);
    }

    #[test]
    fn display_escapes_values() {
        let mut document = document();
        document.set_options(OptionSet::new().set("title", "it's mine")).unwrap();
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let output = output(&mut document);
        let line = document.command_line().unwrap();
        assert_eq!(
            line,
            format!(
                "{BINARY} --title {} {} {}",
                crate::args::quote("it's mine"),
                crate::args::quote("https://example.com/"),
                crate::args::quote(&output)
            )
        );
        document.set_options(OptionSet::new().set("enable_escaping", "0")).unwrap();
        assert_eq!(
            document.command_line().unwrap(),
            format!("{BINARY} --title it's mine https://example.com/ {output}")
        );
    }

    #[test]
    fn temp_files_are_removed_on_drop() {
        let mut document = document();
        document.add_page("<html>inline</html>", OptionSet::new()).unwrap();
        let args = argv(&mut document);
        let page = PathBuf::from(&args[1]);
        let output = PathBuf::from(output(&mut document));
        assert!(page.exists() && output.exists());
        drop(document);
        assert!(!page.exists());
        assert!(!output.exists());
    }

    #[test]
    fn close_removes_temp_files() {
        let mut document = document();
        document.set_options(OptionSet::new().set("header-html", "<p>Header</p>")).unwrap();
        document.add_page("<html>inline</html>", OptionSet::new()).unwrap();
        let args = argv(&mut document);
        let paths: Vec<PathBuf> = args.iter().filter(|a| a.contains("tmp_htmlto_")).map(PathBuf::from).collect();
        assert_eq!(paths.len(), 3);
        document.close().unwrap();
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[test]
    fn tmp_dir_setting_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = document();
        document.set_options(OptionSet::new().set("tmp_dir", dir.path().to_string_lossy().into_owned())).unwrap();
        document.add_page("<html></html>", OptionSet::new()).unwrap();
        let args = argv(&mut document);
        assert!(Path::new(&args[1]).starts_with(dir.path()));
        assert!(Path::new(args.last().unwrap()).starts_with(dir.path()));
    }

    #[test]
    fn spawn_failure_surfaces_through_save() {
        let settings = Settings { binary: Some(PathBuf::from("/no/such/wkhtmltopdf")), ..Settings::default() };
        let mut document = Document::with_settings(OutputKind::Pdf, settings);
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let err = document.save_as("/tmp/never-written.pdf").unwrap_err();
        let ErrorKind::RenderFailed(message) = &*err else { panic!("unexpected error {err:?}") };
        assert!(message.starts_with("could not run command /no/such/wkhtmltopdf"), "{message}");
        assert!(document.error().is_some());
    }

    #[cfg(unix)]
    fn with_renderer(renderer: &Renderer) -> Document {
        let settings = Settings { binary: Some(renderer.path()), ..Settings::default() };
        Document::with_settings(OutputKind::Pdf, settings)
    }

    #[cfg(unix)]
    #[test]
    fn render_is_single_shot() {
        let renderer = Renderer::new();
        let mut document = with_renderer(&renderer);
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let first = document.render().unwrap();
        assert_eq!(first.status(), Status::Success);

        let err = document.render().unwrap_err();
        assert_eq!(*err, ErrorKind::AlreadyRendered);
        assert_eq!(document.result(), Some(&first));

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(document.save_as(dir.path().join("a.pdf")).unwrap(), Status::Success);
        assert_eq!(document.save_as(dir.path().join("b.pdf")).unwrap(), Status::Success);
        assert_eq!(fs::read_to_string(dir.path().join("b.pdf")).unwrap(), "%PDF-1.4 fake");
        assert_eq!(renderer.invocations().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn save_triggers_render_once() {
        let renderer = Renderer::new();
        let mut document = with_renderer(&renderer);
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        document.save_as(dir.path().join("a.pdf")).unwrap();
        assert_eq!(document.contents().unwrap(), b"%PDF-1.4 fake");
        assert_eq!(renderer.invocations().len(), 1);
        assert!(renderer.invocations()[0].ends_with(".pdf"));
    }

    #[cfg(unix)]
    #[test]
    fn warnings_tolerated_when_ignored() {
        let renderer = Renderer::new().exit_code(1).stderr("Warning: Failed to load image");
        let mut document = with_renderer(&renderer);
        document.set_options(OptionSet::new().set("ignore_warnings", "1")).unwrap();
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(document.save_as(dir.path().join("a.pdf")).unwrap(), Status::SuccessWithWarnings);
        assert!(document.warnings().unwrap().contains("Failed to load image"));
        assert_eq!(document.error(), None);
    }

    #[cfg(unix)]
    #[test]
    fn warnings_fail_when_not_ignored() {
        let renderer = Renderer::new().exit_code(1).stderr("Warning: Failed to load image");
        let mut document = with_renderer(&renderer);
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = document.save_as(dir.path().join("a.pdf")).unwrap_err();
        let ErrorKind::RenderFailed(message) = &*err else { panic!("unexpected error {err:?}") };
        assert!(message.contains("Failed to load image"));
        assert!(message.contains(&renderer.path().to_string_lossy().into_owned()));
        assert!(!dir.path().join("a.pdf").exists());
        // Failure is remembered, not retried.
        assert!(document.save_as(dir.path().join("a.pdf")).is_err());
        assert_eq!(renderer.invocations().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn missing_output_fails_even_when_ignoring_warnings() {
        let renderer = Renderer::new().exit_code(1).write_output(false);
        let mut document = with_renderer(&renderer);
        document.set_options(OptionSet::new().set("ignore_warnings", "yes")).unwrap();
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        assert_eq!(document.render().unwrap().status(), Status::Failure);
    }

    #[cfg(unix)]
    #[test]
    fn save_failure_is_distinct() {
        let renderer = Renderer::new();
        let mut document = with_renderer(&renderer);
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let destination = Path::new("/no/such/dir/a.pdf");
        let err = document.save_as(destination).unwrap_err();
        assert_eq!(*err, ErrorKind::Save(destination.to_path_buf()));
        assert_eq!(document.result().map(CommandResult::status), Some(Status::Success));
    }

    #[cfg(unix)]
    #[test]
    fn renderer_receives_argv() {
        let renderer = Renderer::new();
        let mut document = with_renderer(&renderer);
        document.set_options(OptionSet::new().set("title", "two words")).unwrap();
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let output = output(&mut document);
        document.render().unwrap();
        assert_eq!(renderer.invocations(), [format!("--title two words https://example.com/ {output}")]);
    }

    #[cfg(unix)]
    #[test]
    fn virtual_display_wraps_command() {
        let renderer = Renderer::new();
        let launcher = Launcher::new();
        let mut document = with_renderer(&renderer);
        document
            .set_options(
                OptionSet::new()
                    .set("enable_xvfb", "1")
                    .set("xvfb_run_binary", launcher.path().to_string_lossy().into_owned())
                    .set("xvfb_run_args", ["--auto-servernum"]),
            )
            .unwrap();
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let args = argv(&mut document);
        assert_eq!(args[0], launcher.path().to_string_lossy());
        assert_eq!(args[1], "--auto-servernum");
        assert_eq!(args[2], renderer.path().to_string_lossy());
        assert_eq!(document.render().unwrap().status(), Status::Success);
        assert_eq!(launcher.launches(), ["--auto-servernum"]);
        assert_eq!(renderer.invocations().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn send_streams_response() {
        let renderer = Renderer::new();
        let mut document = with_renderer(&renderer);
        document.add_page("https://example.com/", OptionSet::new()).unwrap();
        let mut out = Vec::new();
        let written = document.send(&mut out, Some("report.pdf"), true).unwrap();
        assert_eq!(written, 13);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Content-Type: application/pdf\r\n"));
        assert!(out.contains("Content-Disposition: inline; filename=\"report.pdf\"\r\n"));
        assert!(out.ends_with("\r\n\r\n%PDF-1.4 fake"));
    }
}
