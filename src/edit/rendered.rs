use crate::{
    edit::transaction::Transaction,
    foundation::error::{EditError, EditResult},
    model::clip::{Clip, ClipId, ClipSource, MediaRef},
    model::track::TrackId,
    transition::plan::{FadeDirection, FadePlan, TransitionPlan},
};

fn index_on(tx: &Transaction<'_>, track: TrackId, id: ClipId) -> EditResult<usize> {
    tx.track(track)?.index_of(id).ok_or_else(|| {
        EditError::validation(format!("clip {id} is no longer on track {track}"))
    })
}

fn check_rendered_length(media: &MediaRef, needed: u64) -> EditResult<()> {
    if needed == 0 {
        return Err(EditError::invalid_range("rendered clip must be at least one frame"));
    }
    if let Some(len) = media.bounded_length()
        && len < needed
    {
        return Err(EditError::handle(
            format!("rendered media '{}'", media.path),
            needed,
            len,
        ));
    }
    Ok(())
}

fn rendered_clip(tx: &mut Transaction<'_>, name: String, media: &MediaRef, len: u64) -> Clip {
    let id = tx.alloc_clip_id();
    Clip {
        id,
        name,
        source: ClipSource::Media(media.clone()),
        clip_in: 0,
        clip_out: len - 1,
        sync: None,
        filters: Vec::new(),
        container: None,
    }
}

pub(crate) fn add_transition(
    tx: &mut Transaction<'_>,
    plan: &TransitionPlan,
    media: &MediaRef,
) -> EditResult<()> {
    tx.track(plan.track)?.ensure_editable()?;
    let from_index = index_on(tx, plan.track, plan.from_clip)?;
    let to_index = index_on(tx, plan.track, plan.to_clip)?;
    if to_index != from_index + 1 {
        return Err(EditError::validation(format!(
            "clips {} and {} are no longer adjacent",
            plan.from_clip, plan.to_clip
        )));
    }
    let t = tx.track(plan.track)?;
    let mut from = t.clip(from_index)?.clone();
    let mut to = t.clip(to_index)?.clone();
    if from.clip_out != plan.from_out || to.clip_in != plan.to_in {
        return Err(EditError::validation(format!(
            "clips {} and {} changed since the transition was planned",
            plan.from_clip, plan.to_clip
        )));
    }
    if plan.before_cut + plan.after_cut != plan.length {
        return Err(EditError::validation("transition plan split does not add up to its length"));
    }
    if from.len_frames() <= plan.before_cut || to.len_frames() <= plan.after_cut {
        return Err(EditError::invalid_range(
            "transition no longer fits between its clips",
        ));
    }
    check_rendered_length(media, plan.length)?;

    from.clip_out -= plan.before_cut;
    to.clip_in += plan.after_cut;
    let transition = rendered_clip(tx, format!("{} transition", plan.kind), media, plan.length);
    tx.splice(plan.track, from_index, 2, vec![from, transition, to])?;
    Ok(())
}

pub(crate) fn add_fade(tx: &mut Transaction<'_>, plan: &FadePlan, media: &MediaRef) -> EditResult<()> {
    tx.track(plan.track)?.ensure_editable()?;
    let index = index_on(tx, plan.track, plan.clip)?;
    let mut clip = tx.track(plan.track)?.clip(index)?.clone();
    if clip.clip_in != plan.clip_in || clip.clip_out != plan.clip_out {
        return Err(EditError::validation(format!(
            "clip {} changed since the fade was planned",
            plan.clip
        )));
    }
    if clip.len_frames() <= plan.length {
        return Err(EditError::invalid_range("fade no longer fits inside its clip"));
    }
    check_rendered_length(media, plan.length)?;

    let entries = match plan.direction {
        FadeDirection::In => {
            clip.clip_in += plan.length;
            let fade = rendered_clip(tx, "fade in".to_string(), media, plan.length);
            vec![fade, clip]
        }
        FadeDirection::Out => {
            clip.clip_out -= plan.length;
            let fade = rendered_clip(tx, "fade out".to_string(), media, plan.length);
            vec![clip, fade]
        }
    };
    tx.splice(plan.track, index, 1, entries)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/edit/rendered.rs"]
mod tests;
