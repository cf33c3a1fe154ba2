use importer_core::{
    classify_errors, decide_label, normalize_label, ErrorClassification, LabelAction,
};
use importer_logging::{importer_debug, importer_info, importer_warn};

use crate::operator::Escalation;
use crate::selectors::{
    continue_button, edit_note_tab, enter_edit, error_tabs, first_label_result,
    label_results, label_search_widgets, release_actions_heading, release_duplicates_tab,
    release_event_fieldset, remove_label_buttons, widget_input, widget_search_trigger,
    OWN_TEXT_FN,
};
use crate::{ImportError, ImportSession, Page, PageError};

impl<P: Page> ImportSession<P> {
    /// Takes the freshly imported release through the editor: login, duplicate
    /// gate, error triage, optional review, publish.
    pub async fn submit_release(&self) -> Result<(), ImportError> {
        importer_info!("Processing MusicBrainz submission");
        let proceed = self
            .wait_for(continue_button(), self.timings.default_wait)
            .await?;
        self.page.click(&proceed).await?;
        self.settle(self.timings.tab_settle).await;

        let fresh_login = self.log_in_if_required().await?;

        let edit_note = self
            .wait_for(edit_note_tab(), self.timings.edit_wait)
            .await?;
        if fresh_login {
            self.tabs.save_authenticated_profile(&self.page).await?;
        }
        self.page.click(&edit_note).await?;

        self.check_duplicates(&edit_note).await?;
        self.resolve_errors(&edit_note).await?;

        if self.config.manual_review_before_publish {
            self.escalate(Escalation::ManualReview).await?;
        }
        self.publish(&edit_note).await
    }

    async fn check_duplicates(&self, edit_note: &P::Element) -> Result<(), ImportError> {
        importer_info!("Checking for release duplicates");
        self.settle(self.timings.tab_settle).await;
        let duplicates = self
            .wait_for(release_duplicates_tab(), self.timings.default_wait)
            .await?;
        self.settle(self.timings.tab_settle).await;

        if self.page.attribute(&duplicates, "aria-disabled").await?.is_none() {
            importer_warn!("Possible duplicate releases found");
            self.escalate(Escalation::DuplicateReleases).await?;
            self.page.click(edit_note).await?;
        }
        Ok(())
    }

    /// Scans the editor's error tabs and fixes what can be fixed.
    pub async fn resolve_errors(
        &self,
        edit_note: &P::Element,
    ) -> Result<ErrorClassification, ImportError> {
        let errors = match self.page.find_all(&error_tabs()).await {
            Ok(errors) => errors,
            Err(err) => {
                importer_warn!("Could not scan for error tabs: {}", err);
                Vec::new()
            }
        };
        importer_info!("Errors found: {}", errors.len());

        let classification = match errors.as_slice() {
            [single] => {
                self.page.click(single).await?;
                self.settle(self.timings.tab_settle).await;
                let body = self.page.body_text().await?;
                classify_errors(1, Some(&body))
            }
            _ => classify_errors(errors.len(), None),
        };

        match classification {
            ErrorClassification::None => return Ok(classification),
            ErrorClassification::TooManyErrors(count) => {
                self.escalate(Escalation::MultipleErrors { count }).await?;
                return Ok(classification);
            }
            ErrorClassification::LabelMissing => {
                importer_info!("Fixing missing label error");
                self.fix_labels().await?;
            }
            ErrorClassification::Unknown => {
                importer_warn!("Unknown error type, manual intervention required");
                self.escalate(Escalation::UnclassifiedError).await?;
            }
        }

        // Let the editor validate again.
        self.page.click(edit_note).await?;
        if let Some(error) = errors.first() {
            self.page.click(error).await?;
        }
        Ok(classification)
    }

    /// Resolves every label search widget of the release event independently.
    pub async fn fix_labels(&self) -> Result<Vec<LabelAction>, ImportError> {
        let timeout = self.timings.default_wait;
        let fieldset = self.wait_for(release_event_fieldset(), timeout).await?;
        let widgets = self
            .page
            .find_all_in(&fieldset, &label_search_widgets())
            .await?;
        let remove_buttons = self
            .page
            .find_all_in(&fieldset, &remove_label_buttons())
            .await?;

        let mut actions = Vec::with_capacity(widgets.len());
        for (index, widget) in widgets.iter().enumerate() {
            importer_info!("Checking label {}/{}", index + 1, widgets.len());
            let input = self
                .page
                .find_in(widget, &widget_input())
                .await?
                .ok_or_else(|| ImportError::MissingElement("label search input".into()))?;
            let trigger = self
                .page
                .find_in(widget, &widget_search_trigger())
                .await?
                .ok_or_else(|| ImportError::MissingElement("label search button".into()))?;
            self.page.click(&trigger).await?;

            let input_id = self.page.attribute(&input, "id").await?.unwrap_or_default();
            let results = self.wait_for(label_results(&input_id), timeout).await?;
            self.wait_until_shown(&results).await?;

            let first = self
                .page
                .find_in(&results, &first_label_result())
                .await?
                .ok_or_else(|| {
                    ImportError::MissingElement("first label search result".into())
                })?;
            let found = self
                .page
                .evaluate_on(&first, OWN_TEXT_FN)
                .await?
                .as_str()
                .unwrap_or_default()
                .to_string();
            let prefilled = self.page.attribute(&input, "value").await?;

            let action = decide_label(
                &found,
                prefilled.as_deref(),
                self.config.manual_label_selection,
            );
            importer_debug!(
                "Label {}: found '{}', prefilled {:?} -> {:?}",
                index + 1,
                found,
                prefilled,
                action
            );
            match action {
                LabelAction::Select => {
                    importer_info!("Found matching label, selecting it");
                    self.page.click(&first).await?;
                }
                LabelAction::Escalate => {
                    self.escalate(Escalation::LabelMismatch {
                        widget: index,
                        expected: normalize_label(prefilled.as_deref().unwrap_or_default()),
                        found: normalize_label(&found),
                    })
                    .await?;
                }
                LabelAction::Remove => {
                    importer_info!("No matching label, removing the label entry");
                    let remove = remove_buttons.get(index).ok_or_else(|| {
                        ImportError::MissingElement(format!("remove button for label {}", index + 1))
                    })?;
                    self.page.click(remove).await?;
                }
                LabelAction::Skip => {
                    importer_info!("Label {} has no pre-filled name, leaving it", index + 1)
                }
            }
            actions.push(action);
        }
        Ok(actions)
    }

    async fn wait_until_shown(&self, list: &P::Element) -> Result<(), ImportError> {
        let page = &self.page;
        self.waiter
            .wait_until(
                "label search results to show",
                self.timings.default_wait,
                move || async move {
                    let style = page.attribute(list, "style").await?.unwrap_or_default();
                    let hidden = style.to_lowercase().contains("display: none");
                    Ok::<_, PageError>((!hidden).then_some(()))
                },
            )
            .await
    }

    async fn publish(&self, edit_note: &P::Element) -> Result<(), ImportError> {
        importer_info!("Publishing release");
        self.page.click(edit_note).await?;
        let enter = self.wait_for(enter_edit(), self.timings.default_wait).await?;
        self.page.click(&enter).await?;

        importer_info!("Waiting for publish to complete");
        self.wait_for(release_actions_heading(), self.timings.long_wait)
            .await?;
        importer_info!("Release published");
        Ok(())
    }
}
