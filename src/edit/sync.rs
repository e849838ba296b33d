use crate::{
    edit::arrange::move_overwrite,
    edit::transaction::Transaction,
    foundation::error::{EditError, EditResult},
    model::clip::{ClipId, SyncData},
    model::sequence::ClipLocation,
    model::track::TrackId,
};

fn locate(tx: &Transaction<'_>, id: ClipId) -> EditResult<ClipLocation> {
    tx.seq()
        .find_clip(id)
        .ok_or_else(|| EditError::not_found(format!("clip {id}")))
}

/// Check that `child` may be synced to `parent` and return the sync data it would get.
fn sync_link(tx: &Transaction<'_>, child: ClipId, parent: ClipId) -> EditResult<SyncData> {
    if child == parent {
        return Err(EditError::sync(format!("clip {child} cannot sync to itself")));
    }
    let seq = tx.seq();
    let child_loc = locate(tx, child)?;
    let parent_loc = locate(tx, parent)?;
    if child_loc.track == parent_loc.track {
        return Err(EditError::sync(format!(
            "clips {child} and {parent} share track {}",
            child_loc.track
        )));
    }
    let child_clip = seq.clip(child)?;
    let parent_clip = seq.clip(parent)?;
    if child_clip.is_blank() || parent_clip.is_blank() {
        return Err(EditError::sync("blanks cannot take part in sync"));
    }
    if parent_clip.sync.is_some() {
        return Err(EditError::sync(format!(
            "parent {parent} is itself synced to another clip"
        )));
    }
    if !seq.children_of(child).is_empty() {
        return Err(EditError::sync(format!(
            "clip {child} is a sync parent and cannot become a child"
        )));
    }
    Ok(SyncData {
        parent,
        offset: child_loc.start as i64 - parent_loc.start as i64,
    })
}

fn set_sync(tx: &mut Transaction<'_>, child: ClipId, sync: Option<SyncData>) -> EditResult<()> {
    let loc = locate(tx, child)?;
    let mut c = tx.track(loc.track)?.clip(loc.index)?.clone();
    c.sync = sync;
    tx.replace(loc.track, loc.index, c)
}

pub(crate) fn set_clip_sync(
    tx: &mut Transaction<'_>,
    child: ClipId,
    parent: ClipId,
) -> EditResult<()> {
    let link = sync_link(tx, child, parent)?;
    set_sync(tx, child, Some(link))
}

pub(crate) fn set_track_sync(
    tx: &mut Transaction<'_>,
    child_track: TrackId,
    parent_track: TrackId,
) -> EditResult<()> {
    if child_track == parent_track {
        return Err(EditError::sync("a track cannot sync to itself"));
    }
    tx.track(child_track)?.ensure_editable()?;
    let parents = tx.track(parent_track)?;
    let children = tx.track(child_track)?;
    let mut links = Vec::new();
    for span in children.display_list() {
        if span.is_blank {
            continue;
        }
        let parent = parents
            .clip_index_at(span.range.start)
            .and_then(|i| parents.clips.get(i))
            .filter(|c| !c.is_blank())
            .ok_or_else(|| {
                EditError::sync(format!(
                    "no parent clip under frame {} on track {parent_track}",
                    span.range.start
                ))
            })?;
        links.push((span.id, parent.id));
    }
    if links.is_empty() {
        return Err(EditError::no_op(format!("track {child_track} has no clips")));
    }
    let links = links
        .into_iter()
        .map(|(child, parent)| Ok((child, sync_link(tx, child, parent)?)))
        .collect::<EditResult<Vec<_>>>()?;
    for (child, link) in links {
        set_sync(tx, child, Some(link))?;
    }
    Ok(())
}

pub(crate) fn clear_sync(tx: &mut Transaction<'_>, clips: &[ClipId]) -> EditResult<()> {
    for &id in clips {
        let loc = locate(tx, id)?;
        tx.track(loc.track)?.ensure_editable()?;
        set_sync(tx, id, None)?;
    }
    Ok(())
}

pub(crate) fn clear_track_sync(tx: &mut Transaction<'_>, track: TrackId) -> EditResult<()> {
    let t = tx.track(track)?;
    t.ensure_editable()?;
    let synced: Vec<ClipId> = t
        .clips
        .iter()
        .filter(|c| c.sync.is_some())
        .map(|c| c.id)
        .collect();
    for id in synced {
        set_sync(tx, id, None)?;
    }
    Ok(())
}

pub(crate) fn resync(tx: &mut Transaction<'_>, clips: &[ClipId]) -> EditResult<()> {
    for &id in clips {
        let Some(loc) = tx.seq().find_clip(id) else {
            tracing::debug!(clip = %id, "resync skipped, clip no longer in sequence");
            continue;
        };
        let Ok(Some(diff)) = tx.seq().sync_diff(id) else {
            continue;
        };
        if diff == 0 {
            continue;
        }
        let target = loc.start as i64 - diff;
        if target < 0 {
            return Err(EditError::invalid_range(format!(
                "clip {id} would have to move to frame {target}"
            )));
        }
        let clip = tx.track(loc.track)?.clip(loc.index)?.clone();
        move_overwrite(tx, loc.track, loc.start, vec![clip], loc.track, target as u64)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/edit/sync.rs"]
mod tests;
