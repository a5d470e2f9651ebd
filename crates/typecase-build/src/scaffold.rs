//! Project scaffolding for a new site.
//!
//! Lays down the source tree, the fixed output tree, a starter page
//! wired to the configured ids, and the site config file. Files that
//! already exist are left alone.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{context, Environment};

use typecase_sync::{Field, SelectorSpec};

use crate::builder::{ensure_output_tree, write_file, BuildError};

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  <link rel="stylesheet" href="assets/css/styles.css">
</head>
<body id="{{ root }}" data-version="display" data-style="roman" data-weight="regular">
  <header class="controls">
    <label for="{{ version_select }}">Version</label>
    <select id="{{ version_select }}">
      <option selected>Display</option>
      <option>Text</option>
    </select>
    <label for="{{ style_select }}">Style</label>
    <select id="{{ style_select }}">
      <option selected>Roman</option>
      <option>Italic</option>
    </select>
    <label for="{{ weight_select }}">Weight</label>
    <select id="{{ weight_select }}">
      <option>Light</option>
      <option selected>Regular</option>
      <option>Semi Bold</option>
      <option>Bold</option>
    </select>
  </header>
  <!-- Comments are stripped from built pages. -->
  <main class="stage">
    <h1 class="{{ marker }} display roman regular">Hamburgefonstiv</h1>
    <p class="{{ marker }} display roman regular caption">The quick brown fox jumps over the lazy dog.</p>
  </main>
  <script src="assets/js/s.js"></script>
</body>
</html>
"#;

const STARTER_SCSS: &str = r#"// Starter stylesheet. The variant classes at the bottom are the ones
// the dropdown runtime swaps on marked elements.

$stage-width: 60rem;
$ink: #1a1a1a;
$paper: #fdfcf8;

body {
  margin: 0 auto;
  max-width: $stage-width;
  padding: 2rem;
  background: $paper;
  color: $ink;
  font-family: Georgia, serif;
}

.controls {
  display: flex;
  gap: 1rem;
  align-items: center;

  label {
    font-size: 0.85rem;
    text-transform: uppercase;
  }
}

.stage {
  margin-top: 3rem;

  h1 {
    font-size: 4rem;
    margin: 0;
  }
}

.caption {
  font-size: 1.25rem;
}

.roman { font-style: normal; }
.italic { font-style: italic; }

.light { font-weight: 300; }
.regular { font-weight: 400; }
.semi-bold { font-weight: 600; }
.bold { font-weight: 700; }

.display { letter-spacing: -0.02em; }
.text { letter-spacing: 0; }
"#;

const STARTER_JS: &str = r#"// Site scripts. Everything in this directory is linted and bundled
// ahead of the generated dropdown runtime.
(function () {
  'use strict';
}());
"#;

/// Create a new site under `root`. Returns every path that was
/// actually created, in creation order.
pub fn scaffold_site(
    root: &Path,
    title: &str,
    spec: &SelectorSpec,
) -> Result<Vec<PathBuf>, BuildError> {
    spec.validate()?;

    let mut created = Vec::new();
    let src = root.join("src");
    for sub in ["html", "js", "scss", "fonts", "image"] {
        let dir = src.join(sub);
        if !dir.is_dir() {
            fs::create_dir_all(&dir)
                .map_err(|e| BuildError::WriteError(format!("{}: {e}", dir.display())))?;
            created.push(dir);
        }
    }
    created.extend(ensure_output_tree(&root.join("site"))?);

    let files = [
        (root.join("typecase.toml"), site_config(title, spec)),
        (src.join("html/index.html"), index_page(title, spec)?),
        (src.join("scss/main.scss"), STARTER_SCSS.to_string()),
        (src.join("js/site.js"), STARTER_JS.to_string()),
    ];
    for (path, contents) in files {
        if path.exists() {
            tracing::warn!("{} already exists, skipping", path.display());
            continue;
        }
        write_file(&path, &contents)?;
        created.push(path);
    }

    Ok(created)
}

fn index_page(title: &str, spec: &SelectorSpec) -> Result<String, BuildError> {
    let mut env = Environment::new();
    env.add_template_owned("index.html".to_string(), INDEX_TEMPLATE.to_string())
        .expect("Failed to add index template");

    let template = |e: minijinja::Error| BuildError::TemplateError(e.to_string());
    env.get_template("index.html")
        .map_err(template)?
        .render(context! {
            title => title,
            root => &spec.root,
            marker => &spec.marker,
            version_select => spec.select_id(Field::Version),
            style_select => spec.select_id(Field::Style),
            weight_select => spec.select_id(Field::Weight),
        })
        .map_err(template)
}

fn site_config(title: &str, spec: &SelectorSpec) -> String {
    format!(
        r#"[site]
title = "{title}"
src = "src"
out = "site"

[selectors]
root = "{root}"
marker = "{marker}"
version = "{version}"
style = "{style}"
weight = "{weight}"

[styles]
entry = "scss/main.scss"
targets = ["last 2 versions", "> 0.5%"]

[build]
minify = true
strict = false
"#,
        root = spec.root,
        marker = spec.marker,
        version = spec.select_id(Field::Version),
        style = spec.select_id(Field::Style),
        weight = spec.select_id(Field::Weight),
    )
}
