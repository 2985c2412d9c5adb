use services::learn::EditCapability;
use services::{LearnController, LearnService, LearnServiceError};
use study_core::learn::{LearnError, StudyView};
use study_core::model::{StudySetId, UserId};

use crate::views::ViewError;
use crate::vm::FlashcardVm;
use crate::vm::time_fmt::plural;

/// Header data for a learn page; fixed once the set is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LearnPageVm {
    pub study_set_id: StudySetId,
    pub title: String,
    pub can_edit: bool,
}

/// The one thing the learn page shows right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LearnVm {
    Interaction { card: FlashcardVm, round: u32 },
    RoundSummary { round: u32, terms_studied: String },
    Completed { rounds: String },
}

impl LearnVm {
    #[must_use]
    pub fn from_controller(controller: &LearnController, flipped: bool, can_edit: bool) -> Self {
        match controller.view() {
            StudyView::Interaction {
                term,
                index,
                total,
                round,
                starred,
            } => Self::Interaction {
                card: FlashcardVm::new(term, index, total, starred, flipped, can_edit),
                round,
            },
            StudyView::RoundSummary {
                round,
                terms_studied,
            } => Self::RoundSummary {
                round,
                terms_studied: plural(
                    u32::try_from(terms_studied).unwrap_or(u32::MAX),
                    "term",
                    "terms",
                ),
            },
            StudyView::Completed { rounds } => Self::Completed {
                rounds: plural(rounds, "round", "rounds"),
            },
        }
    }
}

/// # Errors
///
/// Returns `ViewError::NotFound` for unknown sets, `ViewError::EmptySet` when
/// the set has no terms, and `ViewError::Unknown` for other failures.
pub async fn start_learn(
    learn: &LearnService,
    capability: &dyn EditCapability,
    study_set_id: StudySetId,
    viewer: Option<UserId>,
) -> Result<(LearnPageVm, LearnController), ViewError> {
    let (set, controller) = match learn.start(study_set_id, viewer).await {
        Ok(started) => started,
        Err(LearnServiceError::NotFound(_)) => return Err(ViewError::NotFound),
        Err(LearnServiceError::Learn(LearnError::NoTerms)) => return Err(ViewError::EmptySet),
        Err(_) => return Err(ViewError::Unknown),
    };

    let page = LearnPageVm {
        study_set_id: set.id,
        can_edit: capability.can_edit(viewer, &set),
        title: set.title,
    };
    Ok((page, controller))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use services::learn::{CreatorOnly, EffectRunner, StorageStudySetSource};
    use storage::repository::{Storage, StudySetRepository};
    use study_core::model::{StudySet, Term, TermId, Visibility};
    use study_core::time::fixed_now;
    use tokio::runtime::Handle;

    use super::*;

    const OWNER: UserId = UserId::new(1);

    async fn learn_service(term_count: u64) -> LearnService {
        let storage = Storage::in_memory();
        let set_id = StudySetId::new(5);
        let terms = (1..=term_count)
            .map(|i| Term::new(TermId::new(i), set_id, format!("w{i}"), "d", 0).unwrap())
            .collect();
        let set = StudySet::new(
            set_id,
            OWNER,
            "Verbs",
            "",
            fixed_now(),
            Visibility::Public,
            terms,
        )
        .unwrap();
        storage.study_sets.upsert_study_set(&set).await.unwrap();

        LearnService::new(
            Arc::new(StorageStudySetSource::new(Arc::clone(&storage.study_sets))),
            EffectRunner::new(Handle::current()),
        )
    }

    #[tokio::test]
    async fn start_learn_grants_edit_to_the_creator_only() {
        let learn = learn_service(2).await;

        let (page, _) = start_learn(&learn, &CreatorOnly, StudySetId::new(5), Some(OWNER))
            .await
            .unwrap();
        assert_eq!(page.title, "Verbs");
        assert!(page.can_edit);

        let (page, _) = start_learn(&learn, &CreatorOnly, StudySetId::new(5), None)
            .await
            .unwrap();
        assert!(!page.can_edit);
    }

    #[tokio::test]
    async fn start_learn_maps_errors_to_view_errors() {
        let empty = learn_service(0).await;
        let err = start_learn(&empty, &CreatorOnly, StudySetId::new(5), None)
            .await
            .unwrap_err();
        assert_eq!(err, ViewError::EmptySet);

        let err = start_learn(&empty, &CreatorOnly, StudySetId::new(6), None)
            .await
            .unwrap_err();
        assert_eq!(err, ViewError::NotFound);
    }

    #[tokio::test]
    async fn vm_follows_the_selected_view() {
        let learn = learn_service(1).await;
        let (_, mut controller) = start_learn(&learn, &CreatorOnly, StudySetId::new(5), None)
            .await
            .unwrap();

        match LearnVm::from_controller(&controller, true, false) {
            LearnVm::Interaction { card, round } => {
                assert_eq!(round, 1);
                assert_eq!(card.face_text(), "d");
            }
            other => panic!("unexpected {other:?}"),
        }

        controller.advance().unwrap();
        assert_eq!(
            LearnVm::from_controller(&controller, false, false),
            LearnVm::RoundSummary {
                round: 1,
                terms_studied: "1 term".into(),
            }
        );

        controller.acknowledge_round_summary(false).unwrap();
        assert_eq!(
            LearnVm::from_controller(&controller, false, false),
            LearnVm::Completed {
                rounds: "1 round".into(),
            }
        );
    }
}
