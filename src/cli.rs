//! Command-line interface definitions and command runners.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::document::{
    DocumentModel, LoadOptions, extract_images, load_document, load_from_json, save_to_json,
};
use crate::error::DocumentError;
use crate::pug::{PostGenerator, PostType};
use crate::utils::parse_w3c_datetime;
use crate::{debug, log};

/// Turn Word blog drafts into JSON models and Pug pages
#[derive(Parser, Debug, Clone)]
#[command(name = "blogdoc", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Site configuration file (default: <config dir>/blogdoc/config.toml)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Parse a .docx draft into a JSON model
    #[command(visible_alias = "p")]
    Parse {
        #[command(flatten)]
        args: ParseArgs,
    },

    /// Generate the Pug page of a saved JSON model
    Pug {
        /// JSON model written by `parse`
        #[arg(value_hint = clap::ValueHint::FilePath)]
        json: PathBuf,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Parse a draft and generate its Pug page in one go
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: ParseArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show or initialize the site configuration
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

/// Arguments shared by `parse` and `build`
#[derive(clap::Args, Debug, Clone)]
pub struct ParseArgs {
    /// Document to parse. If omitted, pick one from the input directory.
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Directory to pick documents from
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub input_dir: Option<PathBuf>,

    /// Directory for the JSON model
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Document type choosing the header image and tags (e.g. theology, code)
    #[arg(short = 't', long)]
    pub doc_type: Option<String>,

    /// Publication date as YYYY-MM-DD (default: document creation date)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<i64>,

    /// Also copy embedded pictures into the image directory
    #[arg(long)]
    pub extract_images: bool,
}

/// Arguments shared by `pug` and `build`
#[derive(clap::Args, Debug, Clone)]
pub struct PageArgs {
    /// Kind of post, deciding the site section
    #[arg(long, value_enum, default_value_t = PostType::Article)]
    pub post_type: PostType,

    /// Root directory for generated pages
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub pug_dir: Option<PathBuf>,
}

fn parse_date(value: &str) -> Result<i64, String> {
    parse_w3c_datetime(value).ok_or_else(|| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

pub fn run(cli: &Cli) -> Result<()> {
    if let Commands::Config { init } = &cli.command {
        return run_config(cli.config.as_deref(), *init);
    }

    let config = SiteConfig::load(cli.config.as_deref())?;
    match &cli.command {
        Commands::Parse { args } => run_parse(&config, args).map(|_| ()),
        Commands::Pug { json, page } => {
            let model = load_from_json(json)?;
            generate_page(&config, &model, page).map(|_| ())
        }
        Commands::Build { args, page } => {
            let model = run_parse(&config, args)?;
            generate_page(&config, &model, page).map(|_| ())
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn run_parse(config: &SiteConfig, args: &ParseArgs) -> Result<DocumentModel> {
    let docx_path = match &args.file {
        Some(file) => file.clone(),
        None => {
            let dir = args.input_dir.as_deref().unwrap_or(&config.paths.input_dir);
            let stdin = io::stdin();
            select_docx_file(dir, &mut stdin.lock(), &mut io::stdout())?
        }
    };

    let json_dir = args.output_dir.as_deref().unwrap_or(&config.paths.json_dir);
    let output_file = json_output_path(json_dir, &docx_path);
    log!("parse"; "Selected file: {}", docx_path.display());
    log!("parse"; "Output file: {}", output_file.display());

    let options = LoadOptions {
        doc_type: args.doc_type.clone(),
        date: args.date,
        words_per_minute: config.reading.words_per_minute,
    };
    let model = load_document(&docx_path, &options)?;
    debug!(
        "parse";
        "'{}' ({}), {} sections, {}",
        model.title,
        model.id,
        model.content.len(),
        model.time.label()
    );

    save_to_json(&model, &output_file)?;

    if args.extract_images {
        let written = extract_images(&docx_path, &model, &config.paths.image_dir)?;
        log!(
            "save";
            "{} images written to {}",
            written.len(),
            config.paths.image_dir.join(&model.id).display()
        );
    }

    Ok(model)
}

fn generate_page(config: &SiteConfig, model: &DocumentModel, page: &PageArgs) -> Result<PathBuf> {
    let root = page.pug_dir.as_deref().unwrap_or(&config.paths.pug_dir);
    let generator = PostGenerator::new(config, model, page.post_type);
    let path = generator.output_path(root);

    generator.generate().write(&path)?;
    log!("pug"; "Page written to {}", path.display());
    Ok(path)
}

fn run_config(explicit: Option<&Path>, init: bool) -> Result<()> {
    if init {
        let path = SiteConfig::init_default(explicit)?;
        log!("config"; "Default configuration written to {}", path.display());
        return Ok(());
    }

    let config = SiteConfig::load(explicit)?;
    match explicit.map(Path::to_path_buf).or_else(SiteConfig::get_config_path) {
        Some(path) if path.exists() => log!("config"; "Using {}", path.display()),
        Some(path) => log!("config"; "{} not found, using defaults", path.display()),
        None => log!("config"; "No configuration directory, using defaults"),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

/// `{json_dir}/{lowercased file stem}.json`
pub fn json_output_path(json_dir: &Path, docx_path: &Path) -> PathBuf {
    let stem = docx_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "document".to_string());
    json_dir.join(format!("{stem}.json"))
}

/// The .docx files of a directory, sorted by name. Word lock files are skipped.
pub fn list_docx_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DocumentError::NoDocxFiles {
                dir: dir.to_path_buf(),
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"))
        })
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| !name.starts_with("~$"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Ask the user to pick one of the .docx files in `dir`
///
/// Keeps asking until a number in range is entered; end of input aborts.
pub fn select_docx_file<R: BufRead, W: Write>(
    dir: &Path,
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf> {
    let files = list_docx_files(dir)?;
    if files.is_empty() {
        return Err(DocumentError::NoDocxFiles {
            dir: dir.to_path_buf(),
        }
        .into());
    }

    writeln!(output, "Available .docx files:")?;
    for (i, file) in files.iter().enumerate() {
        let name = file
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        writeln!(output, "{}. {}", i + 1, name)?;
    }

    loop {
        write!(output, "Enter the number of the file you want to select: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("No file selected");
        }

        match line.trim().parse::<i64>() {
            Ok(choice) if choice >= 1 && choice as usize <= files.len() => {
                return Ok(files[choice as usize - 1].clone());
            }
            Ok(_) => writeln!(
                output,
                "Invalid choice. Please enter a number within the valid range."
            )?,
            Err(_) => writeln!(output, "Invalid input. Please enter a number.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn docx_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    #[test]
    fn test_list_docx_files_sorted_and_filtered() {
        let dir = docx_dir(&["b.docx", "a.DOCX", "notes.txt", "~$a.docx"]);
        let files = list_docx_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.DOCX", "b.docx"]);
    }

    #[test]
    fn test_select_reprompts_until_valid() {
        let dir = docx_dir(&["first.docx", "second.docx"]);
        let mut input = Cursor::new("abc\n7\n2\n");
        let mut output = Vec::new();

        let selected = select_docx_file(dir.path(), &mut input, &mut output).unwrap();
        assert_eq!(selected.file_name().unwrap(), "second.docx");

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.starts_with("Available .docx files:\n1. first.docx\n2. second.docx\n"));
        assert!(printed.contains("Invalid input. Please enter a number.\n"));
        assert!(printed.contains("Invalid choice. Please enter a number within the valid range.\n"));
        assert_eq!(
            printed
                .matches("Enter the number of the file you want to select: ")
                .count(),
            3
        );
    }

    #[test]
    fn test_select_aborts_on_end_of_input() {
        let dir = docx_dir(&["only.docx"]);
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(select_docx_file(dir.path(), &mut input, &mut output).is_err());
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = docx_dir(&[]);
        let err = select_docx_file(dir.path(), &mut Cursor::new("1\n"), &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DocumentError>(),
            Some(DocumentError::NoDocxFiles { .. })
        ));
    }

    #[test]
    fn test_json_output_path() {
        assert_eq!(
            json_output_path(Path::new("output/json"), Path::new("drafts/Grace Alone.docx")),
            Path::new("output/json/grace alone.json")
        );
    }

    #[test]
    fn test_cli_parses_build() {
        let cli = Cli::try_parse_from([
            "blogdoc",
            "build",
            "post.docx",
            "--doc-type",
            "code",
            "--date",
            "2022-10-06",
            "--post-type",
            "note",
        ])
        .unwrap();

        let Commands::Build { args, page } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.file.as_deref(), Some(Path::new("post.docx")));
        assert_eq!(args.date, Some(1_665_014_400_000));
        assert_eq!(page.post_type, PostType::Note);
    }
}
