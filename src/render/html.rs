//! Server-side HTML for a render tree, using the classes in `style`.

use std::fmt::Write;
use std::time::Instant;

use crate::render::code_block::{CodeBlock, CodeBlockState, CodeNode, CopyStatus};
use crate::render::style;
use crate::render::{Block, Inline, RenderTree};
use crate::util::escape_html;

impl RenderTree {
  pub fn to_html(&self) -> String {
    let mut out = String::new();
    for b in &self.blocks {
      write_block(&mut out, b);
    }
    out
  }
}

fn write_block(out: &mut String, block: &Block) {
  match block {
    Block::Heading { level, children } => {
      let lvl = (*level).clamp(1, 6);
      let _ = write!(out, "<h{lvl} class=\"{}\">", style::HEADING[usize::from(lvl) - 1]);
      write_inlines(out, children);
      let _ = write!(out, "</h{lvl}>");
    }
    Block::Paragraph { children } => {
      let _ = write!(out, "<p class=\"{}\">", style::PARAGRAPH);
      write_inlines(out, children);
      out.push_str("</p>");
    }
    Block::List { ordered, start, items } => {
      let (tag, class) = if *ordered { ("ol", style::OL) } else { ("ul", style::UL) };
      let _ = write!(out, "<{tag} class=\"{class}\"");
      if let Some(n) = start.filter(|n| *n != 1 && *ordered) {
        let _ = write!(out, " start=\"{n}\"");
      }
      out.push('>');
      for item in items {
        out.push_str("<li>");
        for b in item {
          write_block(out, b);
        }
        out.push_str("</li>");
      }
      let _ = write!(out, "</{tag}>");
    }
    Block::BlockQuote { children } => {
      let _ = write!(out, "<blockquote class=\"{}\">", style::BLOCKQUOTE);
      for b in children {
        write_block(out, b);
      }
      out.push_str("</blockquote>");
    }
    Block::Table { header, rows } => {
      let _ = write!(out, "<table class=\"{}\"><thead><tr>", style::TABLE);
      for cell in header {
        let _ = write!(out, "<th class=\"{}\">", style::TH);
        write_inlines(out, cell);
        out.push_str("</th>");
      }
      out.push_str("</tr></thead><tbody>");
      for row in rows {
        out.push_str("<tr>");
        for cell in row {
          let _ = write!(out, "<td class=\"{}\">", style::TD);
          write_inlines(out, cell);
          out.push_str("</td>");
        }
        out.push_str("</tr>");
      }
      out.push_str("</tbody></table>");
    }
    Block::Rule => {
      let _ = write!(out, "<hr class=\"{}\"/>", style::RULE);
    }
    Block::Code { code } => write_code(out, code),
  }
}

fn write_inlines(out: &mut String, inlines: &[Inline]) {
  for i in inlines {
    write_inline(out, i);
  }
}

fn write_inline(out: &mut String, inline: &Inline) {
  match inline {
    Inline::Text { text } => out.push_str(&escape_html(text)),
    Inline::Strong { children } => wrap(out, "strong", children),
    Inline::Emphasis { children } => wrap(out, "em", children),
    Inline::Strikethrough { children } => wrap(out, "del", children),
    Inline::Link { href, children } => {
      let _ = write!(
        out,
        "<a class=\"{}\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
        style::LINK,
        escape_html(href)
      );
      write_inlines(out, children);
      out.push_str("</a>");
    }
    Inline::Code { code } => write_code(out, code),
    Inline::TaskMarker { checked } => {
      out.push_str(if *checked { "<input type=\"checkbox\" checked disabled/> " } else { "<input type=\"checkbox\" disabled/> " });
    }
    Inline::SoftBreak => out.push(' '),
    Inline::HardBreak => out.push_str("<br/>"),
  }
}

fn wrap(out: &mut String, tag: &str, children: &[Inline]) {
  let _ = write!(out, "<{tag}>");
  write_inlines(out, children);
  let _ = write!(out, "</{tag}>");
}

fn write_code(out: &mut String, code: &CodeNode) {
  match code {
    CodeNode::Inline { text } => {
      let _ = write!(out, "<code class=\"{}\">{}</code>", style::INLINE_CODE, escape_html(text));
    }
    CodeNode::Block(block) => write_code_block(out, block),
  }
}

fn write_code_block(out: &mut String, block: &CodeBlock) {
  write_code_block_with_state(out, block, &CodeBlockState::new(block), Instant::now());
}

/// Code block markup reflecting `state`: selected language, dropdown and copy acknowledgement.
pub fn write_code_block_with_state(out: &mut String, block: &CodeBlock, state: &CodeBlockState, now: Instant) {
  let _ = write!(
    out,
    "<div class=\"{}\" data-language=\"{}\"><div class=\"{}\"><select class=\"language-select\" data-open=\"{}\">",
    style::CODE_BLOCK,
    state.selected(),
    style::CODE_HEADER,
    state.menu_open()
  );
  for lang in &block.languages {
    let selected = if *lang == state.selected() { " selected" } else { "" };
    let _ = write!(out, "<option value=\"{}\"{}>{}</option>", lang, selected, lang.label());
  }
  let (copied, label) = match state.copy_status(now) {
    CopyStatus::Copied => (true, "Copied"),
    CopyStatus::Idle => (false, "Copy"),
  };
  let _ = write!(
    out,
    "</select><button class=\"copy-button\" data-copied=\"{}\">{}</button></div><pre class=\"{}\"><code>",
    copied,
    label,
    style::CODE_BODY
  );
  for line in &block.lines {
    let _ = write!(
      out,
      "<div class=\"code-line\"><span class=\"{}\">{}</span><span>{}</span></div>",
      style::LINE_NUMBER,
      line.number,
      line.html
    );
  }
  out.push_str("</code></pre></div>");
}
