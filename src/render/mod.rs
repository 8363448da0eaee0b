//! Markdown -> render tree for problem content (description, worked example,
//! concept explanation).
//!
//! The tree is what the client draws; `html::to_html` gives a server-side
//! rendition with the same fixed styling. Code spans go through
//! `code_block::build_code_node`, which decides inline vs block and attaches
//! line numbers plus highlighting.
//!
//! The page-level language is passed in through `RenderContext` rather than
//! read from shared state, so two pages rendering at once never interfere.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use tracing::instrument;

use crate::domain::Language;
use crate::util::unescape_whitespace;

pub mod code_block;
pub mod highlight;
pub mod html;
pub mod style;

pub use code_block::{CodeBlock, CodeNode};
pub use style::DifficultyBadge;

/// Ambient page context a renderer needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderContext {
  /// Language selected on the page; untagged code blocks default to it.
  pub language_hint: Option<Language>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct RenderTree {
  pub blocks: Vec<Block>,
}

impl RenderTree {
  pub fn is_empty(&self) -> bool { self.blocks.is_empty() }

  /// Every code block in document order, including those nested in lists,
  /// quotes and inline positions.
  pub fn code_blocks(&self) -> Vec<&CodeBlock> {
    let mut out = Vec::new();
    for b in &self.blocks {
      collect_block_code(b, &mut out);
    }
    out
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
  Heading { level: u8, children: Vec<Inline> },
  Paragraph { children: Vec<Inline> },
  List { ordered: bool, start: Option<u64>, items: Vec<Vec<Block>> },
  BlockQuote { children: Vec<Block> },
  Table { header: Vec<Vec<Inline>>, rows: Vec<Vec<Vec<Inline>>> },
  Rule,
  Code { code: CodeNode },
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
  Text { text: String },
  Strong { children: Vec<Inline> },
  Emphasis { children: Vec<Inline> },
  Strikethrough { children: Vec<Inline> },
  Link { href: String, children: Vec<Inline> },
  Code { code: CodeNode },
  TaskMarker { checked: bool },
  SoftBreak,
  HardBreak,
}

/// Render markdown into a tree. Empty or whitespace-only input gives an empty tree.
#[instrument(level = "debug", skip(markdown), fields(len = markdown.len()))]
pub fn render(markdown: &str, ctx: &RenderContext) -> RenderTree {
  if markdown.trim().is_empty() {
    return RenderTree::default();
  }
  let source = unescape_whitespace(markdown);

  let mut options = Options::empty();
  options.insert(Options::ENABLE_TABLES);
  options.insert(Options::ENABLE_STRIKETHROUGH);
  options.insert(Options::ENABLE_TASKLISTS);

  let mut builder = TreeBuilder::new(*ctx);
  for event in Parser::new_ext(&source, options) {
    builder.process_event(event);
  }
  builder.finish()
}

/// Convenience for optional fields.
pub fn render_opt(markdown: Option<&str>, ctx: &RenderContext) -> RenderTree {
  markdown.map(|m| render(m, ctx)).unwrap_or_default()
}

fn heading_level(level: HeadingLevel) -> u8 {
  match level {
    HeadingLevel::H1 => 1,
    HeadingLevel::H2 => 2,
    HeadingLevel::H3 => 3,
    HeadingLevel::H4 => 4,
    HeadingLevel::H5 => 5,
    HeadingLevel::H6 => 6,
  }
}

enum Frame {
  Root(Vec<Block>),
  BlockQuote(Vec<Block>),
  List { ordered: bool, start: Option<u64>, items: Vec<Vec<Block>> },
  /// Tight list items carry inline content without a paragraph wrapper.
  Item { blocks: Vec<Block>, inline: Vec<Inline> },
  Paragraph(Vec<Inline>),
  Heading(u8, Vec<Inline>),
  Strong(Vec<Inline>),
  Emphasis(Vec<Inline>),
  Strikethrough(Vec<Inline>),
  Link(String, Vec<Inline>),
  Table { header: Vec<Vec<Inline>>, rows: Vec<Vec<Vec<Inline>>> },
  TableHead(Vec<Vec<Inline>>),
  TableRow(Vec<Vec<Inline>>),
  TableCell(Vec<Inline>),
  CodeBlock { tag: Option<String>, text: String },
}

struct TreeBuilder {
  ctx: RenderContext,
  stack: Vec<Frame>,
}

impl TreeBuilder {
  fn new(ctx: RenderContext) -> Self {
    Self { ctx, stack: vec![Frame::Root(Vec::new())] }
  }

  fn process_event(&mut self, event: Event) {
    match event {
      Event::Start(tag) => self.start_tag(tag),
      Event::End(tag_end) => self.end_tag(tag_end),
      Event::Text(text) => {
        if let Some(Frame::CodeBlock { text: buf, .. }) = self.stack.last_mut() {
          buf.push_str(&text);
        } else {
          self.push_inline(Inline::Text { text: text.to_string() });
        }
      }
      Event::Code(code) => {
        let node = code_block::build_code_node(&code, None, false, &self.ctx);
        self.push_inline(Inline::Code { code: node });
      }
      // Raw HTML is shown as text, never injected.
      Event::Html(raw) | Event::InlineHtml(raw) => self.push_inline(Inline::Text { text: raw.to_string() }),
      Event::SoftBreak => self.push_inline(Inline::SoftBreak),
      Event::HardBreak => self.push_inline(Inline::HardBreak),
      Event::Rule => self.push_block(Block::Rule),
      Event::TaskListMarker(checked) => self.push_inline(Inline::TaskMarker { checked }),
      _ => {}
    }
  }

  fn start_tag(&mut self, tag: Tag) {
    let frame = match tag {
      Tag::Paragraph => Frame::Paragraph(Vec::new()),
      Tag::Heading { level, .. } => Frame::Heading(heading_level(level), Vec::new()),
      Tag::BlockQuote(_) => Frame::BlockQuote(Vec::new()),
      Tag::CodeBlock(kind) => Frame::CodeBlock {
        tag: match kind {
          CodeBlockKind::Fenced(lang) if !lang.trim().is_empty() => Some(lang.to_string()),
          _ => None,
        },
        text: String::new(),
      },
      Tag::List(start) => Frame::List { ordered: start.is_some(), start, items: Vec::new() },
      Tag::Item => Frame::Item { blocks: Vec::new(), inline: Vec::new() },
      Tag::Emphasis => Frame::Emphasis(Vec::new()),
      Tag::Strong => Frame::Strong(Vec::new()),
      Tag::Strikethrough => Frame::Strikethrough(Vec::new()),
      Tag::Link { dest_url, .. } => Frame::Link(dest_url.to_string(), Vec::new()),
      Tag::Table(_) => Frame::Table { header: Vec::new(), rows: Vec::new() },
      Tag::TableHead => Frame::TableHead(Vec::new()),
      Tag::TableRow => Frame::TableRow(Vec::new()),
      Tag::TableCell => Frame::TableCell(Vec::new()),
      // Images, footnotes, metadata: their text still flows into the parent.
      _ => return,
    };
    self.stack.push(frame);
  }

  fn end_tag(&mut self, tag_end: TagEnd) {
    let closes_frame = matches!(
      tag_end,
      TagEnd::Paragraph
        | TagEnd::Heading(_)
        | TagEnd::BlockQuote(_)
        | TagEnd::CodeBlock
        | TagEnd::List(_)
        | TagEnd::Item
        | TagEnd::Emphasis
        | TagEnd::Strong
        | TagEnd::Strikethrough
        | TagEnd::Link
        | TagEnd::Table
        | TagEnd::TableHead
        | TagEnd::TableRow
        | TagEnd::TableCell
    );
    if !closes_frame || self.stack.len() <= 1 {
      return;
    }
    let Some(frame) = self.stack.pop() else { return };

    match frame {
      Frame::Paragraph(children) => self.push_block(Block::Paragraph { children }),
      Frame::Heading(level, children) => self.push_block(Block::Heading { level, children }),
      Frame::BlockQuote(children) => self.push_block(Block::BlockQuote { children }),
      Frame::CodeBlock { tag, text } => {
        let code = code_block::build_code_node(&text, tag.as_deref(), true, &self.ctx);
        self.push_block(Block::Code { code });
      }
      Frame::List { ordered, start, items } => self.push_block(Block::List { ordered, start, items }),
      Frame::Item { mut blocks, inline } => {
        if !inline.is_empty() {
          blocks.push(Block::Paragraph { children: inline });
        }
        if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
          items.push(blocks);
        }
      }
      Frame::Emphasis(children) => self.push_inline(Inline::Emphasis { children }),
      Frame::Strong(children) => self.push_inline(Inline::Strong { children }),
      Frame::Strikethrough(children) => self.push_inline(Inline::Strikethrough { children }),
      Frame::Link(href, children) => self.push_inline(Inline::Link { href, children }),
      Frame::Table { header, rows } => self.push_block(Block::Table { header, rows }),
      Frame::TableHead(cells) => {
        if let Some(Frame::Table { header, .. }) = self.stack.last_mut() {
          *header = cells;
        }
      }
      Frame::TableRow(cells) => {
        if let Some(Frame::Table { rows, .. }) = self.stack.last_mut() {
          rows.push(cells);
        }
      }
      Frame::TableCell(children) => match self.stack.last_mut() {
        Some(Frame::TableHead(cells)) | Some(Frame::TableRow(cells)) => cells.push(children),
        _ => {}
      },
      Frame::Root(blocks) => self.stack.push(Frame::Root(blocks)),
    }
  }

  fn push_inline(&mut self, inline: Inline) {
    match self.stack.last_mut() {
      Some(Frame::Paragraph(c))
      | Some(Frame::Heading(_, c))
      | Some(Frame::Strong(c))
      | Some(Frame::Emphasis(c))
      | Some(Frame::Strikethrough(c))
      | Some(Frame::Link(_, c))
      | Some(Frame::TableCell(c)) => c.push(inline),
      Some(Frame::Item { inline: buf, .. }) => buf.push(inline),
      Some(Frame::CodeBlock { text, .. }) => {
        if let Inline::Text { text: t } = inline {
          text.push_str(&t);
        }
      }
      _ => self.push_block(Block::Paragraph { children: vec![inline] }),
    }
  }

  fn push_block(&mut self, block: Block) {
    match self.stack.last_mut() {
      Some(Frame::Root(blocks)) | Some(Frame::BlockQuote(blocks)) => blocks.push(block),
      Some(Frame::Item { blocks, inline }) => {
        if !inline.is_empty() {
          blocks.push(Block::Paragraph { children: std::mem::take(inline) });
        }
        blocks.push(block);
      }
      Some(Frame::List { items, .. }) => items.push(vec![block]),
      // Blocks inside inline containers (malformed nesting) are flattened away.
      _ => {
        if let Some(Frame::Root(blocks)) = self.stack.first_mut() {
          blocks.push(block);
        }
      }
    }
  }

  fn finish(mut self) -> RenderTree {
    // Close anything left open by truncated input.
    while self.stack.len() > 1 {
      let end = match self.stack.last() {
        Some(Frame::Paragraph(_)) => TagEnd::Paragraph,
        Some(Frame::Heading(level, _)) => TagEnd::Heading(match *level {
          1 => HeadingLevel::H1,
          2 => HeadingLevel::H2,
          3 => HeadingLevel::H3,
          4 => HeadingLevel::H4,
          5 => HeadingLevel::H5,
          _ => HeadingLevel::H6,
        }),
        Some(Frame::BlockQuote(_)) => TagEnd::BlockQuote(None),
        Some(Frame::CodeBlock { .. }) => TagEnd::CodeBlock,
        Some(Frame::List { ordered, .. }) => TagEnd::List(*ordered),
        Some(Frame::Item { .. }) => TagEnd::Item,
        Some(Frame::Emphasis(_)) => TagEnd::Emphasis,
        Some(Frame::Strong(_)) => TagEnd::Strong,
        Some(Frame::Strikethrough(_)) => TagEnd::Strikethrough,
        Some(Frame::Link(..)) => TagEnd::Link,
        Some(Frame::Table { .. }) => TagEnd::Table,
        Some(Frame::TableHead(_)) => TagEnd::TableHead,
        Some(Frame::TableRow(_)) => TagEnd::TableRow,
        Some(Frame::TableCell(_)) => TagEnd::TableCell,
        Some(Frame::Root(_)) | None => break,
      };
      self.end_tag(end);
    }
    match self.stack.pop() {
      Some(Frame::Root(blocks)) => RenderTree { blocks },
      _ => RenderTree::default(),
    }
  }
}

fn collect_block_code<'a>(block: &'a Block, out: &mut Vec<&'a CodeBlock>) {
  match block {
    Block::Code { code: CodeNode::Block(b) } => out.push(b),
    Block::Heading { children, .. } | Block::Paragraph { children } => {
      children.iter().for_each(|i| collect_inline_code(i, out))
    }
    Block::List { items, .. } => items.iter().flatten().for_each(|b| collect_block_code(b, out)),
    Block::BlockQuote { children } => children.iter().for_each(|b| collect_block_code(b, out)),
    Block::Table { header, rows } => header
      .iter()
      .chain(rows.iter().flatten())
      .flatten()
      .for_each(|i| collect_inline_code(i, out)),
    Block::Rule | Block::Code { .. } => {}
  }
}

fn collect_inline_code<'a>(inline: &'a Inline, out: &mut Vec<&'a CodeBlock>) {
  match inline {
    Inline::Code { code: CodeNode::Block(b) } => out.push(b),
    Inline::Strong { children }
    | Inline::Emphasis { children }
    | Inline::Strikethrough { children }
    | Inline::Link { children, .. } => children.iter().for_each(|i| collect_inline_code(i, out)),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ctx() -> RenderContext {
    RenderContext::default()
  }

  #[test]
  fn empty_markdown_renders_nothing() {
    assert!(render("", &ctx()).is_empty());
    assert!(render("   \n ", &ctx()).is_empty());
    assert!(render_opt(None, &ctx()).is_empty());
  }

  #[test]
  fn fenced_python_block_is_numbered_and_trimmed() {
    let tree = render("```python\ndef f():\n    pass\n```", &ctx());
    assert_eq!(tree.blocks.len(), 1);
    let Block::Code { code: CodeNode::Block(b) } = &tree.blocks[0] else {
      panic!("expected a code block, got {:?}", tree.blocks[0]);
    };
    assert_eq!(b.language, Language::Python);
    assert_eq!(b.text, "def f():\n    pass");
    assert_eq!(b.lines.iter().map(|l| l.number).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(b.languages, Language::ALL.to_vec());
  }

  #[test]
  fn one_line_fence_without_tag_renders_as_block() {
    let tree = render("```\nint a;\n```", &RenderContext::default());
    let Block::Code { code: CodeNode::Block(b) } = &tree.blocks[0] else {
      panic!("expected a code block, got {:?}", tree.blocks[0]);
    };
    assert_eq!(b.text, "int a;");
    assert_eq!(b.language, Language::Cpp);
    assert_eq!(b.lines.len(), 1);
  }

  #[test]
  fn double_escaped_markdown_is_unescaped_first() {
    let tree = render("# Title\\n\\nSome `x` text", &ctx());
    assert_eq!(tree.blocks.len(), 2);
    assert!(matches!(&tree.blocks[0], Block::Heading { level: 1, .. }));
    let Block::Paragraph { children } = &tree.blocks[1] else { panic!("paragraph") };
    assert!(children.contains(&Inline::Code { code: CodeNode::Inline { text: "x".into() } }));
  }

  #[test]
  fn untagged_block_uses_page_language() {
    let ctx = RenderContext { language_hint: Some(Language::Java) };
    let tree = render("```\nint a;\nint b;\n```", &ctx);
    let blocks = tree.code_blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].language, Language::Java);
    assert!(blocks[0].tag.is_none());
  }

  #[test]
  fn lists_tables_quotes_and_links() {
    let md = "- one\n- **two**\n\n1. a\n2. b\n\n> quoted\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n[site](https://example.com)";
    let tree = render(md, &ctx());
    let kinds: Vec<&str> = tree
      .blocks
      .iter()
      .map(|b| match b {
        Block::List { ordered: false, .. } => "ul",
        Block::List { ordered: true, .. } => "ol",
        Block::BlockQuote { .. } => "quote",
        Block::Table { .. } => "table",
        Block::Paragraph { .. } => "p",
        _ => "other",
      })
      .collect();
    assert_eq!(kinds, vec!["ul", "ol", "quote", "table", "p"]);

    let Block::List { items, .. } = &tree.blocks[0] else { unreachable!() };
    assert_eq!(items.len(), 2);
    let Block::Table { header, rows } = &tree.blocks[3] else { unreachable!() };
    assert_eq!(header.len(), 2);
    assert_eq!(rows.len(), 1);
    let Block::Paragraph { children } = &tree.blocks[4] else { unreachable!() };
    assert!(matches!(&children[0], Inline::Link { href, .. } if href == "https://example.com"));
  }

  #[test]
  fn long_inline_code_is_promoted_to_block() {
    let long = "x".repeat(70);
    let tree = render(&format!("Use `{long}` here"), &ctx());
    assert_eq!(tree.code_blocks().len(), 1);
  }

  #[test]
  fn tree_serializes_with_type_tags() {
    let tree = render("```cpp\nint main() {}\n```", &ctx());
    let v = serde_json::to_value(&tree).unwrap();
    assert_eq!(v["blocks"][0]["type"], "code");
    assert_eq!(v["blocks"][0]["code"]["mode"], "block");
    assert_eq!(v["blocks"][0]["code"]["language"], "cpp");
  }
}
