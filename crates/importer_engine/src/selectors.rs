//! Page vocabulary of the aggregator, the release editor, MagicISRC and the
//! cover-art uploader. Locators used inside another element are CSS so that
//! every binding can scope them.

use importer_core::Locator;

pub const AGGREGATOR_URL: &str = "https://harmony.pulsewidth.org.uk/";
pub const ALREADY_LINKED_MARKER: &str = "is already linked to this";
pub const LOGIN_TITLE_PREFIX: &str = "Log in";
pub const ISRC_LOGIN_MARKER: &str = "Login to MusicBrainz";

// Aggregator
pub fn provider_toggle() -> Locator {
    Locator::id("musicbrainz-input")
}

pub fn url_input() -> Locator {
    Locator::id("url-input")
}

pub fn import_button() -> Locator {
    Locator::xpath("//input[@type='submit' and @value='Import into MusicBrainz']")
}

pub fn existing_release_link() -> Locator {
    Locator::css("div p a[href*='musicbrainz.org/release']")
}

pub fn release_id_link() -> Locator {
    Locator::xpath("//li[@data-provider='MusicBrainz']//a[contains(@class,'provider-id')]")
}

// Release editor
pub fn continue_button() -> Locator {
    Locator::xpath("//button[@type='submit' and normalize-space() = 'Continue']")
}

pub fn username_input() -> Locator {
    Locator::id("id-username")
}

pub fn password_input() -> Locator {
    Locator::id("id-password")
}

pub fn remember_me() -> Locator {
    Locator::id("id-remember_me")
}

pub fn edit_note_tab() -> Locator {
    Locator::xpath("//a[normalize-space() = 'Edit note']")
}

pub fn release_duplicates_tab() -> Locator {
    Locator::xpath("//li[a[normalize-space(text())='Release duplicates']]")
}

pub fn error_tabs() -> Locator {
    Locator::class_name("error-tab")
}

pub fn release_event_fieldset() -> Locator {
    Locator::xpath("//fieldset[legend[normalize-space(.)='Release event']]")
}

pub fn label_search_widgets() -> Locator {
    Locator::css("span.autocomplete")
}

pub fn remove_label_buttons() -> Locator {
    Locator::css(".remove-release-label")
}

pub fn widget_input() -> Locator {
    Locator::css("input")
}

pub fn widget_search_trigger() -> Locator {
    Locator::css("img")
}

/// Result list the autocomplete widget renders for the input with `input_id`.
pub fn label_results(input_id: &str) -> Locator {
    let escaped = input_id.replace('\\', "\\\\").replace('"', "\\\"");
    Locator::css(format!("ul[data-input-id=\"{escaped}\"]"))
}

pub fn first_label_result() -> Locator {
    Locator::css("li:first-of-type a")
}

pub fn enter_edit() -> Locator {
    Locator::id("enter-edit")
}

pub fn release_actions_heading() -> Locator {
    Locator::xpath("//h2[contains(normalize-space(.), 'Release Actions')]")
}

// MagicISRC
pub fn magic_isrc_link() -> Locator {
    Locator::xpath("//a[contains(normalize-space(.), 'Open with MagicISRC')]")
}

pub fn isrc_check_button() -> Locator {
    Locator::id("check-isrcs-submit")
}

pub fn isrc_login_button() -> Locator {
    Locator::xpath("//button[@type='button' and normalize-space() = 'Login to MusicBrainz']")
}

pub fn allow_access_button() -> Locator {
    Locator::xpath("//button[@type='submit' and normalize-space() = 'Allow access']")
}

pub fn isrc_submit() -> Locator {
    Locator::id("edit-submit")
}

pub fn isrc_success() -> Locator {
    Locator::xpath("//p[contains(normalize-space(.), 'The ISRCs have been successfully submitted.')]")
}

// External IDs
pub fn external_id_links() -> Locator {
    Locator::xpath("//a[contains(normalize-space(.), 'Link external IDs')]")
}

pub fn enter_edit_button() -> Locator {
    Locator::xpath("//button[@type='submit' and normalize-space() = 'Enter edit']")
}

pub fn edit_banner() -> Locator {
    Locator::class_name("banner")
}

// Cover art
pub fn cover_figures() -> Locator {
    Locator::css("figure.cover-image")
}

pub fn cover_link() -> Locator {
    Locator::css("a")
}

pub fn cover_image() -> Locator {
    Locator::css("img")
}

pub fn add_cover_art_link() -> Locator {
    Locator::xpath("//a[normalize-space() = 'Add cover art']")
}

pub fn file_input() -> Locator {
    Locator::css("input[type='file']")
}

pub fn cover_count_label() -> Locator {
    Locator::xpath("//a[contains(@href, '/cover-art')]/bdi")
}

pub fn front_type() -> Locator {
    Locator::xpath("//li[label/span[normalize-space() = 'Front']]")
}

pub fn cover_thanks() -> Locator {
    Locator::xpath("//p[contains(normalize-space(.), 'Thank you, your')]")
}

/// Direct text of the element (descendant text excluded), trimmed and lower-cased.
pub const OWN_TEXT_FN: &str = "function() { \
    return Array.from(this.childNodes) \
        .filter(n => n.nodeType === Node.TEXT_NODE) \
        .map(n => n.textContent) \
        .join('').trim().toLowerCase(); }";

/// Rewrites production database links and form targets to `host`.
pub fn rewrite_target_links_script(host: &str) -> String {
    format!(
        r#"(() => {{
    let changed = 0;
    for (const el of document.querySelectorAll('a[href*="//musicbrainz.org"], form[action*="//musicbrainz.org"]')) {{
        const attr = el.tagName === 'FORM' ? 'action' : 'href';
        el.setAttribute(attr, el.getAttribute(attr).replace('//musicbrainz.org', '//{host}'));
        changed += 1;
    }}
    return changed;
}})()"#
    )
}
