use crate::{cli::OutputFormat, config::AppConfig, error::Result};
use bili_resolver::{ResolutionOutcome, ResolvedLink};
#[cfg(feature = "colored-output")]
use colored::*;
use serde::Serialize;
use std::io::Write;

pub const SENDER_NAME: &str = "B站bot";

pub const DEFAULT_GREETING: &str = "B站bot为您服务 ٩( 'ω' )و";

pub const DEFAULT_INFO_TEMPLATE: &str = "标题：{title}\n作者：{author}\n简介：{description}";

pub const DEFAULT_OVERSIZE_TEMPLATE: &str =
    "视频大小 {actual_mb}MB 超过限制 {limit_mb}MB，已跳过：{url}";

/// One message node, the unit a chat host would send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum Node {
    Text(String),
    Video { url: String, quality: String },
}

#[derive(Debug, Clone)]
pub struct Templates {
    pub greeting: String,
    pub info: String,
    pub oversize: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            info: DEFAULT_INFO_TEMPLATE.to_string(),
            oversize: DEFAULT_OVERSIZE_TEMPLATE.to_string(),
        }
    }
}

impl Templates {
    pub fn from_config(config: &AppConfig) -> Self {
        let pick = |custom: &Option<String>, fallback: &str| {
            custom
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            greeting: pick(&config.greeting_template, DEFAULT_GREETING),
            info: pick(&config.info_template, DEFAULT_INFO_TEMPLATE),
            oversize: pick(&config.oversize_template, DEFAULT_OVERSIZE_TEMPLATE),
        }
    }

    /// Renders the text node of a resolved link. Lines mentioning `{description}` are
    /// dropped when the description is empty.
    pub fn render_info(&self, link: &ResolvedLink) -> String {
        let metadata = &link.metadata;
        self.info
            .lines()
            .filter(|line| !(metadata.description.is_empty() && line.contains("{description}")))
            .map(|line| {
                line.replace("{title}", &metadata.title)
                    .replace("{author}", &metadata.author)
                    .replace("{description}", &metadata.description)
                    .replace("{url}", &link.source_url)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_oversize(&self, url: &str, actual_mb: f64, limit_mb: f64) -> String {
        self.oversize
            .replace("{url}", url)
            .replace("{actual_mb}", &format!("{actual_mb:.1}"))
            .replace("{limit_mb}", &format!("{limit_mb:.1}"))
    }
}

pub struct OutputManager {
    colored: bool,
    templates: Templates,
}

impl OutputManager {
    pub fn new(colored: bool, templates: Templates) -> Self {
        Self { colored, templates }
    }

    /// Turns outcomes into message nodes; skipped links produce nothing.
    pub fn build_nodes(&self, outcomes: &[ResolutionOutcome]) -> Vec<Node> {
        let mut nodes = Vec::new();
        for outcome in outcomes {
            match outcome {
                ResolutionOutcome::Resolved(link) => {
                    nodes.push(Node::Text(self.templates.render_info(link)));
                    nodes.push(Node::Video {
                        url: link.stream.direct_url.clone(),
                        quality: link.stream.quality_label(),
                    });
                }
                ResolutionOutcome::Oversize {
                    source_url,
                    actual_mb,
                    limit_mb,
                } => {
                    nodes.push(Node::Text(self.templates.render_oversize(
                        source_url, *actual_mb, *limit_mb,
                    )));
                }
                ResolutionOutcome::Skipped { .. } => {}
            }
        }
        nodes
    }

    pub fn format_outcomes(
        &self,
        outcomes: &[ResolutionOutcome],
        format: &OutputFormat,
        pack: bool,
    ) -> Result<String> {
        let nodes = self.build_nodes(outcomes);
        match format {
            OutputFormat::Pretty => Ok(self.format_pretty(&nodes, pack)),
            OutputFormat::Json => self.format_json(outcomes, &nodes, pack, true),
            OutputFormat::JsonCompact => self.format_json(outcomes, &nodes, pack, false),
        }
    }

    /// Renders nothing at all, greeting included, when no link produced a node.
    fn format_pretty(&self, nodes: &[Node], pack: bool) -> String {
        let mut output = String::new();
        if nodes.is_empty() {
            return output;
        }

        output.push_str(&self.colorize(&self.templates.greeting, &Color::Green, true));
        output.push('\n');

        if pack {
            output.push('\n');
            output.push_str(&self.header(nodes.len()));
            for node in nodes {
                output.push_str(&self.format_node(node, "  "));
            }
        } else {
            for node in nodes {
                output.push('\n');
                output.push_str(&self.header(1));
                output.push_str(&self.format_node(node, "  "));
            }
        }

        output
    }

    fn header(&self, count: usize) -> String {
        let label = if count > 1 {
            format!("[{SENDER_NAME}] {count} nodes")
        } else {
            format!("[{SENDER_NAME}]")
        };
        format!("{}\n", self.colorize(&label, &Color::Yellow, true))
    }

    fn format_node(&self, node: &Node, indent: &str) -> String {
        let mut output = String::new();
        match node {
            Node::Text(text) => {
                for line in text.lines() {
                    output.push_str(&format!(
                        "{indent}{}\n",
                        self.colorize(line, &Color::Cyan, false)
                    ));
                }
            }
            Node::Video { url, quality } => {
                output.push_str(&format!(
                    "{indent}{} [{}]: {}\n",
                    self.colorize("Video", &Color::Yellow, false),
                    self.colorize(quality, &Color::Cyan, false),
                    self.colorize(url, &Color::Blue, false)
                ));
            }
        }
        output
    }

    fn format_json(
        &self,
        outcomes: &[ResolutionOutcome],
        nodes: &[Node],
        pack: bool,
        pretty: bool,
    ) -> Result<String> {
        let output = serde_json::json!({
            "sender": SENDER_NAME,
            "greeting": &self.templates.greeting,
            "packed": pack,
            "nodes": nodes,
            "outcomes": outcomes,
        });

        let mut result = if pretty {
            serde_json::to_string_pretty(&output)?
        } else {
            serde_json::to_string(&output)?
        };
        result.push('\n');

        Ok(result)
    }

    pub fn format_links(&self, links: &[String], format: &OutputFormat) -> Result<String> {
        let mut result = match format {
            OutputFormat::Pretty => {
                let mut output = String::new();
                output.push_str(&self.colorize(
                    &format!("Found {} link(s):", links.len()),
                    &Color::Green,
                    true,
                ));
                output.push('\n');
                for (index, link) in links.iter().enumerate() {
                    output.push_str(&format!(
                        "  {}. {}\n",
                        index + 1,
                        self.colorize(link, &Color::Blue, false)
                    ));
                }
                return Ok(output);
            }
            OutputFormat::Json => serde_json::to_string_pretty(links)?,
            OutputFormat::JsonCompact => serde_json::to_string(links)?,
        };
        result.push('\n');
        Ok(result)
    }

    fn colorize(&self, text: &str, color: &Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Blue => text.blue(),
                    Color::Cyan => text.cyan(),
                };
                if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                }
            } else {
                text.to_string()
            }
        }

        #[cfg(not(feature = "colored-output"))]
        {
            let _ = (self.colored, color, bold);
            text.to_string()
        }
    }
}

enum Color {
    Green,
    Yellow,
    Blue,
    Cyan,
}

pub fn write_output(content: &str, output_file: Option<&std::path::Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        None => {
            print!("{content}");
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bili_resolver::{StreamDescriptor, StreamFormat, VideoMetadata};

    fn resolved(description: &str) -> ResolutionOutcome {
        ResolutionOutcome::Resolved(ResolvedLink {
            source_url: "https://www.bilibili.com/video/BV1xx411c7mD".to_string(),
            metadata: VideoMetadata {
                title: "标题".to_string(),
                description: description.to_string(),
                author: "UP主(uid:2)".to_string(),
            },
            stream: StreamDescriptor {
                direct_url: "https://upos.example/v.mp4".to_string(),
                format: StreamFormat::Progressive,
                quality: 80,
            },
        })
    }

    fn manager() -> OutputManager {
        OutputManager::new(false, Templates::default())
    }

    #[test]
    fn resolved_link_becomes_text_and_video_nodes() {
        let nodes = manager().build_nodes(&[resolved("简介")]);

        assert_eq!(
            nodes,
            vec![
                Node::Text("标题：标题\n作者：UP主(uid:2)\n简介：简介".to_string()),
                Node::Video {
                    url: "https://upos.example/v.mp4".to_string(),
                    quality: "1080P".to_string(),
                },
            ]
        );
    }

    #[test]
    fn empty_description_line_is_dropped() {
        let nodes = manager().build_nodes(&[resolved("")]);
        assert_eq!(nodes[0], Node::Text("标题：标题\n作者：UP主(uid:2)".to_string()));
    }

    #[test]
    fn skipped_links_stay_silent() {
        let outcomes = vec![
            ResolutionOutcome::Skipped {
                link: "https://b23.tv/broken".to_string(),
            },
            ResolutionOutcome::Oversize {
                source_url: "https://www.bilibili.com/video/BV1xx411c7mD".to_string(),
                actual_mb: 500.0,
                limit_mb: 100.0,
            },
        ];

        let nodes = manager().build_nodes(&outcomes);
        assert_eq!(
            nodes,
            vec![Node::Text(
                "视频大小 500.0MB 超过限制 100.0MB，已跳过：https://www.bilibili.com/video/BV1xx411c7mD"
                    .to_string()
            )]
        );
    }

    #[test]
    fn all_skipped_prints_nothing() {
        let outcomes = vec![
            ResolutionOutcome::Skipped {
                link: "https://b23.tv/broken".to_string(),
            },
            ResolutionOutcome::Skipped {
                link: "https://www.bilibili.com/video/BV1xx411c7mD".to_string(),
            },
        ];

        for pack in [true, false] {
            let output = manager()
                .format_outcomes(&outcomes, &OutputFormat::Pretty, pack)
                .unwrap();
            assert!(output.is_empty());
        }
    }

    #[test]
    fn video_node_shows_quality_label() {
        let output = manager()
            .format_outcomes(&[resolved("")], &OutputFormat::Pretty, false)
            .unwrap();
        assert!(output.contains("Video [1080P]: https://upos.example/v.mp4"));
    }

    #[test]
    fn custom_templates_are_used() {
        let config = AppConfig {
            greeting_template: Some("hi".to_string()),
            info_template: Some("{title} by {author} <{url}>".to_string()),
            oversize_template: Some("   ".to_string()),
            ..AppConfig::default()
        };
        let templates = Templates::from_config(&config);

        assert_eq!(templates.greeting, "hi");
        assert_eq!(templates.oversize, DEFAULT_OVERSIZE_TEMPLATE);

        let ResolutionOutcome::Resolved(link) = resolved("") else {
            unreachable!()
        };
        assert_eq!(
            templates.render_info(&link),
            "标题 by UP主(uid:2) <https://www.bilibili.com/video/BV1xx411c7mD>"
        );
    }

    #[test]
    fn packing_controls_node_headers() {
        let outcomes = vec![resolved("a"), resolved("b")];
        let manager = manager();

        let packed = manager
            .format_outcomes(&outcomes, &OutputFormat::Pretty, true)
            .unwrap();
        assert!(packed.starts_with(DEFAULT_GREETING));
        assert_eq!(packed.matches("[B站bot]").count(), 1);
        assert!(packed.contains("[B站bot] 4 nodes"));

        let unpacked = manager
            .format_outcomes(&outcomes, &OutputFormat::Pretty, false)
            .unwrap();
        assert_eq!(unpacked.matches("[B站bot]").count(), 4);
    }

    #[test]
    fn json_output_carries_outcomes() {
        let output = manager()
            .format_outcomes(&[resolved("")], &OutputFormat::JsonCompact, true)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["packed"], true);
        assert_eq!(value["nodes"][1]["type"], "video");
        assert_eq!(value["nodes"][1]["content"]["quality"], "1080P");
        assert_eq!(value["outcomes"][0]["status"], "resolved");
        assert_eq!(
            value["outcomes"][0]["stream"]["direct_url"],
            "https://upos.example/v.mp4"
        );
    }
}
