use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlMediaElement, MouseEvent};
use yew::prelude::*;

use crate::story::{MediaItem, MediaKind};

/// Markup attributes of one gallery thumbnail.
#[derive(Clone, Copy, PartialEq)]
pub struct GalleryEntry {
    pub kind: &'static str,
    pub src: &'static str,
    pub poster: &'static str,
    pub caption: &'static str,
    pub link: &'static str,
}

pub fn media_items(entries: &[GalleryEntry]) -> Rc<[MediaItem]> {
    entries
        .iter()
        .map(|e| MediaItem::from_attrs(e.kind, e.src, e.poster, e.caption, e.link))
        .collect::<Vec<_>>()
        .into()
}

/// Sets the `muted` property on every video under `root`. The markup
/// attribute alone only mutes videos created by the HTML parser.
pub fn mute_videos(root: &NodeRef) {
    let Some(root) = root.cast::<Element>() else {
        return;
    };
    let Ok(videos) = root.query_selector_all("video") else {
        return;
    };
    for i in 0..videos.length() {
        if let Some(video) = videos
            .item(i)
            .and_then(|node| node.dyn_into::<HtmlMediaElement>().ok())
        {
            video.set_muted(true);
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct GalleryProps {
    pub items: Rc<[MediaItem]>,
    /// Emits the clicked position.
    pub on_open: Callback<usize>,
}

fn thumbnail(item: &MediaItem) -> Html {
    match item.kind {
        MediaKind::Video => html! {
            <video
                src={item.src.clone()}
                poster={item.poster.clone()}
                playsinline=true
                muted=true
                preload="metadata"
            />
        },
        MediaKind::Image => html! {
            <img src={item.src.clone()} loading="lazy" alt={item.alt_text().to_string()} />
        },
    }
}

#[function_component(Gallery)]
pub fn gallery(props: &GalleryProps) -> Html {
    let grid_ref = use_node_ref();
    {
        let grid_ref = grid_ref.clone();
        use_effect_with_deps(
            move |_| {
                mute_videos(&grid_ref);
                || ()
            },
            props.items.clone(),
        );
    }

    html! {
        <div class="gallery-grid" ref={grid_ref}>
            <style>
                {r#"
                    .gallery-grid {
                        display: grid;
                        grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
                        gap: 12px;
                    }
                    .gallery-item {
                        margin: 0;
                        aspect-ratio: 9 / 16;
                        border-radius: 12px;
                        overflow: hidden;
                        cursor: pointer;
                        background: #1d1d1d;
                    }
                    .gallery-item img,
                    .gallery-item video {
                        width: 100%;
                        height: 100%;
                        object-fit: cover;
                        pointer-events: none;
                    }
                "#}
            </style>
            { for props.items.iter().enumerate().map(|(i, item)| {
                let on_open = props.on_open.clone();
                let onclick = Callback::from(move |_: MouseEvent| on_open.emit(i));
                let kind = match item.kind {
                    MediaKind::Video => "video",
                    MediaKind::Image => "image",
                };
                html! {
                    <figure class="gallery-item" data-type={kind} {onclick}>
                        { thumbnail(item) }
                    </figure>
                }
            }) }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_become_media_items_in_order() {
        let entries = [
            GalleryEntry {
                kind: "video",
                src: "/media/bath.mp4",
                poster: "/media/bath.jpg",
                caption: "Bathroom refresh",
                link: "",
            },
            GalleryEntry {
                kind: "image",
                src: "/media/deck.jpg",
                poster: "",
                caption: "",
                link: "https://example.com/deck",
            },
        ];
        let items = media_items(&entries);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, MediaKind::Video);
        assert_eq!(items[0].caption.as_deref(), Some("Bathroom refresh"));
        assert_eq!(items[1].kind, MediaKind::Image);
        assert_eq!(items[1].poster, None);
    }
}
