//! Page fixtures for the aggregator, the release editor and its sub-task tabs.

use importer_engine::selectors as sel;

use super::{Node, Reaction, TabSpec};

pub const RELEASE_ID: &str = "0d8b35d6-6c5b-4b8e-9d0a-0c0b2bb9a7b1";
pub const EXISTING_RELEASE: &str = "https://musicbrainz.org/release/4c0ffee0-1111-2222-3333-444455556666";

/// Harmony result page. `linked` carries the existing release link.
pub fn aggregator(linked: Option<&str>, processing: TabSpec) -> TabSpec {
    let body = match linked {
        Some(link) => format!("This album is already linked to this release: {link}"),
        None => "Release lookup. Import into MusicBrainz".to_string(),
    };
    TabSpec::new("Harmony")
        .body(&body)
        .node(Node::new(sel::provider_toggle()).named("provider"))
        .node(Node::new(sel::url_input()).named("url"))
        .node(Node::new(sel::import_button()).named("import").opens(processing))
        .nodes(linked.map(|link| Node::new(sel::existing_release_link()).text(link)))
}

/// Harmony result page whose import button never becomes usable.
pub fn aggregator_with_disabled_import(processing: TabSpec) -> TabSpec {
    TabSpec::new("Harmony")
        .body("Release lookup. Import into MusicBrainz")
        .node(Node::new(sel::provider_toggle()).named("provider"))
        .node(Node::new(sel::url_input()).named("url"))
        .node(
            Node::new(sel::import_button())
                .named("import")
                .disabled()
                .opens(processing),
        )
}

/// One label search widget of the release event.
#[derive(Debug, Clone)]
pub struct LabelWidget {
    pub prefilled: Option<&'static str>,
    pub first_result: &'static str,
}

/// The release editor as it shows after the import action.
#[derive(Debug, Clone)]
pub struct Editor {
    pub login_required: bool,
    pub duplicates: bool,
    pub errors: usize,
    pub error_body: String,
    pub labels: Vec<LabelWidget>,
    pub isrc: Option<TabSpec>,
    pub external_links: usize,
    /// `(link href, image src)` per cover element.
    pub covers: Vec<(Option<&'static str>, Option<&'static str>)>,
    pub existing_covers: u32,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            login_required: false,
            duplicates: false,
            errors: 0,
            error_body: String::new(),
            labels: Vec::new(),
            isrc: Some(isrc_tool(false, true)),
            external_links: 1,
            covers: vec![(
                Some("https://img.example.com/covers/full.png"),
                Some("https://img.example.com/covers/thumb.png"),
            )],
            existing_covers: 0,
        }
    }
}

impl Editor {
    /// Single missing-label error over the given widgets.
    pub fn with_missing_labels(labels: Vec<LabelWidget>) -> Self {
        Self {
            errors: 1,
            error_body: "Release event: You haven\u{2019}t selected a label for \u{201c}Foo\u{201d}."
                .to_string(),
            labels,
            ..Self::default()
        }
    }

    pub fn tab(&self) -> TabSpec {
        let mut proceed = Node::new(sel::continue_button()).named("continue");
        if self.login_required {
            proceed = proceed.on_click(Reaction::SetTitle("Log in - MusicBrainz".into()));
        }

        let mut duplicates = Node::new(sel::release_duplicates_tab()).named("duplicates");
        if !self.duplicates {
            duplicates = duplicates.attr("aria-disabled", "true");
        }

        let mut fieldset = Node::new(sel::release_event_fieldset());
        let mut result_lists = Vec::new();
        for (index, label) in self.labels.iter().enumerate() {
            let input_id = format!("label-input-{index}");
            let mut input = Node::new(sel::widget_input()).attr("id", &input_id);
            if let Some(prefilled) = label.prefilled {
                input = input.attr("value", prefilled);
            }
            fieldset = fieldset
                .child(
                    Node::new(sel::label_search_widgets())
                        .named(&format!("label-{index}"))
                        .child(input)
                        .child(Node::new(sel::widget_search_trigger()).named(&format!("search-{index}"))),
                )
                .child(Node::new(sel::remove_label_buttons()).named(&format!("remove-{index}")));
            result_lists.push(
                Node::new(sel::label_results(&input_id))
                    .attr("style", "display: block;")
                    .child(
                        Node::new(sel::first_label_result())
                            .named(&format!("result-{index}"))
                            .text(label.first_result),
                    ),
            );
        }

        let covers = self.covers.iter().map(|(href, src)| {
            let mut figure = Node::new(sel::cover_figures());
            if let Some(href) = href {
                figure = figure.child(Node::new(sel::cover_link()).attr("href", href));
            }
            if let Some(src) = src {
                figure = figure.child(Node::new(sel::cover_image()).attr("src", src));
            }
            figure
        });

        let mut tab = TabSpec::new("Release editor")
            .body(&self.error_body)
            .node(proceed)
            .node(Node::new(sel::username_input()).named("username"))
            .node(Node::new(sel::password_input()).named("password"))
            .node(Node::new(sel::remember_me()).named("remember"))
            .node(Node::new(sel::edit_note_tab()).named("edit-note"))
            .node(duplicates)
            .nodes((0..self.errors).map(|i| Node::new(sel::error_tabs()).named(&format!("error-{i}"))))
            .node(fieldset)
            .nodes(result_lists)
            .node(Node::new(sel::enter_edit()).named("enter-edit"))
            .node(Node::new(sel::release_actions_heading()))
            .nodes((0..self.external_links).map(|i| {
                Node::new(sel::external_id_links())
                    .named(&format!("external-{i}"))
                    .opens(external_ids_edit())
            }))
            .nodes(covers)
            .node(
                Node::new(sel::add_cover_art_link())
                    .named("add-cover")
                    .opens(cover_uploader(self.existing_covers)),
            )
            .node(Node::new(sel::release_id_link()).text(&format!(" {RELEASE_ID} ")));
        if let Some(isrc) = &self.isrc {
            tab = tab.node(Node::new(sel::magic_isrc_link()).named("isrc").opens(isrc.clone()));
        }
        tab
    }
}

pub fn isrc_tool(login_required: bool, succeeds: bool) -> TabSpec {
    let body = if login_required {
        "MagicISRC. Login to MusicBrainz to submit."
    } else {
        "MagicISRC"
    };
    let tab = TabSpec::new("MagicISRC")
        .body(body)
        .node(Node::new(sel::isrc_check_button()))
        .node(Node::new(sel::isrc_login_button()).named("isrc-login"))
        .node(Node::new(sel::allow_access_button()).named("allow-access"))
        .node(Node::new(sel::isrc_submit()).named("isrc-submit"));
    if succeeds {
        tab.node(Node::new(sel::isrc_success()))
    } else {
        tab
    }
}

pub fn external_ids_edit() -> TabSpec {
    TabSpec::new("Edit recording")
        .node(Node::new(sel::enter_edit_button()).named("external-enter"))
        .node(Node::new(sel::edit_banner()))
}

pub fn cover_uploader(existing: u32) -> TabSpec {
    TabSpec::new("Add cover art")
        .node(Node::new(sel::file_input()).named("file"))
        .node(Node::new(sel::cover_count_label()).text(&format!("Cover art ({existing})")))
        .node(Node::new(sel::front_type()).named("front"))
        .node(Node::new(sel::enter_edit_button()).named("cover-enter"))
        .node(Node::new(sel::cover_thanks()))
}
