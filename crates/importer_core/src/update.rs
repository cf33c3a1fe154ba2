use crate::{AlbumJob, AlbumState, Effect, ImportConfig, Msg};

/// Pure update function: applies a stage outcome to the job and returns any effects.
///
/// A message that does not belong to the job's current state leaves the job
/// untouched and produces no effects.
pub fn update(mut job: AlbumJob, msg: Msg, config: &ImportConfig) -> (AlbumJob, Vec<Effect>) {
    let effects = match (job.state(), msg) {
        (AlbumState::OpenSource, Msg::SourceOpened) => {
            job.set_state(AlbumState::SubmitUrl);
            Vec::new()
        }
        (AlbumState::SubmitUrl, Msg::UrlSubmitted) => {
            job.set_state(AlbumState::CheckExisting);
            Vec::new()
        }
        (AlbumState::CheckExisting, Msg::AlreadyLinked { link }) => {
            job.set_state(AlbumState::AlreadyLinked);
            job.set_release_id(link.clone());
            let mut effects = Vec::new();
            if config.copy_release_id_to_clipboard {
                effects.push(Effect::CopyToClipboard(link));
            }
            if config.pause_on_found_release {
                effects.push(Effect::PauseForOperator);
            }
            effects
        }
        (AlbumState::CheckExisting, Msg::NotLinked) => {
            job.set_state(AlbumState::Import);
            if config.use_test_server {
                vec![Effect::EnableTestServer]
            } else {
                Vec::new()
            }
        }
        (AlbumState::Import, Msg::ImportOpened) => {
            job.set_state(AlbumState::MbSubmit);
            Vec::new()
        }
        (AlbumState::MbSubmit, Msg::Published) => {
            job.set_state(AlbumState::IsrcSubmit);
            Vec::new()
        }
        (AlbumState::IsrcSubmit, Msg::IsrcFinished) => {
            job.set_state(AlbumState::ExternalLinks);
            Vec::new()
        }
        (AlbumState::ExternalLinks, Msg::LinksFinished) => {
            job.set_state(AlbumState::CoverArt);
            Vec::new()
        }
        (AlbumState::CoverArt, Msg::CoverArtFinished) => {
            job.set_state(AlbumState::Done);
            // The identifier lives on the processing tab, so read it before closing.
            let mut effects = Vec::with_capacity(3);
            if config.copy_release_id_to_clipboard {
                effects.push(Effect::ReadReleaseId);
            }
            if config.close_processing_tab_after_processing {
                effects.push(Effect::CloseProcessingTab);
            }
            effects.push(Effect::ReturnToSource);
            effects
        }
        (AlbumState::Done, Msg::ReleaseIdRead { id }) => {
            job.set_release_id(id.clone());
            if config.copy_release_id_to_clipboard {
                vec![Effect::CopyToClipboard(id)]
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    };

    (job, effects)
}
