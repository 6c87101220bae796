use std::{env, fs, path::PathBuf};

fn http_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let convert = clap::Command::new("convert")
        .about("Render one HTML page through a template")
        .arg(
            clap::arg!(--file <PATH> "Local HTML file (used when nothing is piped on stdin)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--url <URL> "URL to fetch (used when neither stdin nor --file is given)"))
        .arg(clap::arg!(-t --template <NAME> "Template name, e.g. html_to_md.jinja").required(true))
        .arg(
            clap::arg!(--template_dir <DIR> "Directory searched for the template before the built-ins")
                .value_name("DIR")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--mirror_links <ROOT> "Rewrite relative links to Markdown mirrors under this root URL"))
        .arg(clap::arg!(--max_links <N> "Keep at most this many links"));

    let crawl = clap::Command::new("crawl")
        .about("List the pages a root page links to and render a manifest")
        .arg(clap::arg!(<ROOT> "Root page: an http(s) URL or a local HTML file"))
        .arg(clap::arg!(-t --template <NAME> "Manifest template name").default_value("llms.txt.jinja"))
        .arg(
            clap::arg!(--template_dir <DIR> "Directory searched for the template before the built-ins")
                .value_name("DIR")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--json "Print the discovered pages as JSON instead of a manifest"));

    let mut cmd = clap::Command::new("mdmirror")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert HTML pages into Markdown for LLM crawlers")
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand(http_args(convert))
        .subcommand(http_args(crawl));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "mdmirror", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "mdmirror", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "mdmirror", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "mdmirror", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
