use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use mosaic_feed::{FeedConfig, LayoutState, Viewport, arrange};
use mosaic_shard::{
    ContentLoader, FeedController, PublicUrlStore, RefreshOutcome, StaticContentSource, StoredPost,
};
use tracing::debug;

use crate::output;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Character grid on stdout, summary on stderr
    #[default]
    Ascii,
    /// Snapshot of the layout as pretty JSON
    Json,
}

pub struct RenderOptions<'a> {
    pub posts: Option<&'a Path>,
    pub demo: usize,
    pub config: Option<&'a Path>,
    pub width: f32,
    pub height: f32,
    pub seed: Option<u64>,
    pub extend: usize,
    pub format: OutputFormat,
    pub storage_url: &'a str,
}

pub fn execute(options: RenderOptions<'_>) -> Result<()> {
    let mut config = match options.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            parse_config(&text).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => FeedConfig::default(),
    };
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    let rows = match options.posts {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read posts {}", path.display()))?;
            parse_posts(&text).with_context(|| format!("invalid posts {}", path.display()))?
        }
        None => demo_posts(options.demo),
    };
    if rows.is_empty() {
        output::warn("no posts to place, the layout will be all filler");
    }

    let loader = ContentLoader::new(
        Arc::new(StaticContentSource::new(rows)),
        Arc::new(PublicUrlStore::new(options.storage_url)),
    );
    let viewport = Viewport::new(options.width, options.height);
    let controller =
        FeedController::new(config, viewport, loader).context("cannot start a feed session")?;

    match controller.refresh_blocking() {
        Ok(RefreshOutcome::Loaded { items, cells }) => {
            output::status("Loaded", format!("{items} posts into {cells} cells"));
        }
        Ok(RefreshOutcome::Superseded { generation }) => {
            bail!("fetch {generation} was superseded before it finished")
        }
        Err(err) => {
            output::feed_status(&controller.status());
            return Err(err).context("content fetch failed");
        }
    }

    for _ in 0..options.extend {
        let cells = controller.extend()?;
        output::status("Extended", format!("+{cells} cells"));
    }

    let snapshot = controller.snapshot();
    debug!(tiles = snapshot.state.len(), "rendering snapshot");
    match options.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        OutputFormat::Ascii => {
            let mosaic = Mosaic::draw(&snapshot.state, snapshot.grid.columns);
            print!("{}", mosaic.text);
            output::feed_status(&snapshot.status);
            output::status(
                "Layout",
                format!(
                    "{} tiles ({} content, {} filler), {} cells on {} columns x {} rows",
                    snapshot.state.len(),
                    mosaic.legend.len(),
                    snapshot.state.len() - mosaic.legend.len(),
                    snapshot.state.total_cells(),
                    snapshot.grid.columns,
                    mosaic.rows,
                ),
            );
            if mosaic.holes > 0 {
                output::warn(format!("{} grid cells left uncovered by auto-flow", mosaic.holes));
            }
            output::legend(mosaic.legend.iter().map(|(glyph, id)| (*glyph, id.as_str())));
        }
    }
    Ok(())
}

pub fn parse_config(text: &str) -> Result<FeedConfig> {
    let config: FeedConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Posts are a JSON array of `{ "id": .., "content_path": .. }` objects.
pub fn parse_posts(text: &str) -> Result<Vec<StoredPost>> {
    Ok(serde_json::from_str(text)?)
}

fn demo_posts(count: usize) -> Vec<StoredPost> {
    (1..=count)
        .map(|n| {
            let path = format!("demo/{n}.jpg");
            StoredPost::new(n.to_string(), Some(path.as_str()))
        })
        .collect()
}

const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Text rendering of an arranged layout.
struct Mosaic {
    text: String,
    rows: usize,
    holes: usize,
    /// Glyph and source id of every content tile, in tile order.
    legend: Vec<(char, String)>,
}

impl Mosaic {
    /// Content tiles get a letter, filler tiles `.`, holes a blank. Each cell
    /// is two characters wide so tiles look roughly square.
    fn draw(state: &LayoutState, columns: u32) -> Self {
        let tiles = state.tiles();
        let arrangement = arrange(tiles, columns);

        let mut legend = Vec::new();
        let glyphs: Vec<char> = tiles
            .iter()
            .map(|tile| {
                if tile.is_filler() {
                    return '.';
                }
                let glyph = char::from(GLYPHS[legend.len() % GLYPHS.len()]);
                legend.push((glyph, tile.source_id().to_owned()));
                glyph
            })
            .collect();

        let mut text = String::new();
        for row in 0..arrangement.rows() {
            for col in 0..arrangement.columns() {
                let glyph = arrangement.cell(row, col).map_or(' ', |index| glyphs[index]);
                text.push(glyph);
                text.push(glyph);
            }
            text.push('\n');
        }

        Self {
            text,
            rows: arrangement.rows(),
            holes: arrangement.holes(),
            legend,
        }
    }
}
