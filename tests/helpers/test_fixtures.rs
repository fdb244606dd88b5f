//! On-disk Marko projects for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use url::Url;

/// Template used by most tests, opened from `pages/home/template.marko`.
pub const HOME_TEMPLATE: &str = r#"<div class="home">
  <app-header title="Welcome"/>
  <app-button label="Go" on-click('handleClick')/>
  <ghost-tag/>
</div>
"#;

/// A small project with one taglib-declared tag, one directory tag with a
/// `marko-tag.json`, a declared-but-unimplemented tag and a page with a
/// component logic file.
pub struct MarkoProject {
    dir: TempDir,
}

impl MarkoProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create project dir");
        let project = Self { dir };

        project.write("package.json", r#"{ "name": "fixture", "dependencies": {} }"#);
        project.write(
            "marko.json",
            r#"{
  "<app-button>": {
    "template": "./components/app-button/index.marko",
    "@label": "string",
    "autocomplete": [
      { "snippet": "app-button label=\"${1}\"", "descriptionMoreURL": "https://markojs.com/docs/custom-tags/" }
    ]
  },
  "<ghost-tag>": {
    "@visible": "boolean"
  }
}
"#,
        );
        project.write("components/app-button/index.marko", "<button>${input.label}</button>\n");
        project.write("components/app-header/index.marko", "<header>${input.title}</header>\n");
        project.write(
            "components/app-header/marko-tag.json",
            "{\n  \"@title\": \"string\"\n}\n",
        );
        project.write("pages/home/template.marko", HOME_TEMPLATE);
        project.write(
            "pages/home/component.js",
            "module.exports = {\n  onCreate() {},\n  handleClick(event) {\n    this.emit('click', event);\n  }\n};\n",
        );
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn url(&self, relative: &str) -> Url {
        Url::from_file_path(self.path(relative)).expect("fixture path should be absolute")
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        fs::write(&path, contents).expect("failed to write fixture file");
        path
    }
}
