use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flowpager::script::Script;
use flowpager::{Error, PageContext, PageList, SplitConfig};

#[derive(Parser)]
#[command(name = "flowpager", version, about = "Split rendered e-book flows into pages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Paginate a JSON event script and optionally write the page-list cache
    Split {
        input: PathBuf,
        /// Where to write the binary page list
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Page height; overrides the script's value
        #[arg(long)]
        page_height: Option<i32>,
        #[arg(long)]
        font_size: Option<i32>,
        #[arg(long)]
        footnote_margin: Option<i32>,
    },
    /// Print the pages stored in a page-list cache
    Inspect { input: PathBuf },
}

fn print_pages(pages: &PageList) {
    println!(
        "+{:-<8}+{:-<12}+{:-<10}+{:-<7}+{:-<8}+{:-<12}+",
        "", "", "", "", "", ""
    );
    println!(
        "| {:<6} | {:<10} | {:<8} | {:<5} | {:<6} | {:<10} |",
        "Page", "Start", "Height", "Flow", "Notes", "Flags"
    );
    println!(
        "+{:-<8}+{:-<12}+{:-<10}+{:-<7}+{:-<8}+{:-<12}+",
        "", "", "", "", "", ""
    );
    for page in pages {
        let mut flags = String::new();
        if page.is_cover() {
            flags.push_str("cover ");
        }
        if page.is_mostly_rtl() {
            flags.push_str("rtl ");
        }
        if page.footnotes_mostly_rtl() {
            flags.push_str("fn-rtl");
        }
        println!(
            "| {:<6} | {:<10} | {:<8} | {:<5} | {:<6} | {:<10} |",
            page.index,
            page.start,
            page.height,
            page.flow,
            page.fragment_count(),
            flags.trim_end()
        );
    }
    println!(
        "+{:-<8}+{:-<12}+{:-<10}+{:-<7}+{:-<8}+{:-<12}+",
        "", "", "", "", "", ""
    );
    println!(
        "{} pages{}",
        pages.len(),
        if pages.has_non_linear_flows() {
            format!(", {} flows", pages.flow_count())
        } else {
            String::new()
        }
    );
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Split {
            input,
            output,
            page_height,
            font_size,
            footnote_margin,
        } => {
            let script = Script::load(&input)?;
            let page_height = page_height.or(script.page_height).ok_or_else(|| {
                Error::Script("no page height in script or on the command line".into())
            })?;
            let mut config = SplitConfig::new(page_height);
            if let Some(size) = font_size.or(script.doc_font_size) {
                config = config.with_doc_font_size(size);
            }
            if let Some(margin) = footnote_margin.or(script.footnote_margin) {
                config = config.with_footnote_margin(margin);
            }

            let mut ctx = PageContext::new(config);
            ctx.set_progress_callback(
                Box::new(|percent: u8| log::info!("Formatting: {percent}%")),
                script.total_blocks,
            );
            script.replay(&mut ctx);
            let pages = ctx.finalize()?;
            print_pages(&pages);

            if let Some(output) = output {
                pages.save(&output)?;
                log::info!("Wrote {}", output.display());
            }
            Ok(())
        }
        Command::Inspect { input } => {
            let pages = PageList::load(&input)?;
            print_pages(&pages);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
