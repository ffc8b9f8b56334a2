use std::time::Duration;

use kb_bridge::{BridgeError, BridgeHandle, BridgeReply, BridgeSettings};
use kb_core::{Effect, Msg, Remote};
use kb_logging::{kb_debug, kb_info};

/// Runs effects against the backend and turns replies back into messages.
pub struct EffectRunner {
    bridge: BridgeHandle<Msg>,
}

impl EffectRunner {
    pub fn new(settings: &BridgeSettings) -> Result<Self, BridgeError> {
        Ok(Self {
            bridge: BridgeHandle::new(settings)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            kb_debug!("invoking {}", effect.command_name());
            self.run(effect);
        }
    }

    pub fn subscribe_events(&self) {
        kb_info!("subscribing to backend events");
        self.bridge.subscribe_events();
    }

    pub fn unsubscribe_events(&self) {
        self.bridge.unsubscribe_events();
    }

    /// Remote calls still waiting for a reply.
    pub fn pending(&self) -> usize {
        self.bridge.pending()
    }

    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.bridge.recv_timeout(timeout).map(reply_to_msg)
    }

    pub fn try_next_msg(&self) -> Option<Msg> {
        self.bridge.try_recv().map(reply_to_msg)
    }

    fn run(&self, effect: Effect) {
        match effect {
            Effect::LoadTechnologies => self.bridge.run(|backend| async move {
                Msg::TechnologiesLoaded(remote(backend.get_technologies().await))
            }),
            Effect::CreateTechnology { name, language } => {
                self.bridge.run(move |backend| async move {
                    let result = backend.create_technology(&name, language.as_deref()).await;
                    Msg::TechnologyCreated(remote(result))
                })
            }
            Effect::DeleteTechnology { technology_id } => {
                self.bridge.run(move |backend| async move {
                    let result = backend.delete_technology(technology_id).await;
                    Msg::TechnologyDeleted {
                        technology_id,
                        result: remote(result),
                    }
                })
            }
            Effect::LoadVersions { technology_id } => self.bridge.run(move |backend| async move {
                let result = backend.get_technology_versions(technology_id).await;
                Msg::VersionsLoaded {
                    technology_id,
                    result: remote(result),
                }
            }),
            Effect::CreateVersion {
                technology_id,
                version,
            } => self.bridge.run(move |backend| async move {
                let result = backend
                    .create_technology_version(technology_id, &version)
                    .await;
                Msg::VersionCreated(remote(result))
            }),
            Effect::DeleteVersion { version_id } => self.bridge.run(move |backend| async move {
                let result = backend.delete_technology_version(version_id).await;
                Msg::VersionDeleted {
                    version_id,
                    result: remote(result),
                }
            }),
            Effect::LoadUrls { version_id } => self.bridge.run(move |backend| async move {
                let result = backend.get_version_documentation_urls(version_id).await;
                Msg::UrlsLoaded {
                    version_id,
                    result: remote(result),
                }
            }),
            Effect::AddUrl(request) => self.bridge.run(move |backend| async move {
                Msg::UrlAdded(remote(backend.add_documentation_url(&request).await))
            }),
            Effect::LoadUrlDetail { url_id } => self.bridge.run(move |backend| async move {
                let result = backend.get_full_documentation_url(url_id).await;
                Msg::UrlDetailLoaded {
                    url_id,
                    result: remote(result),
                }
            }),
            Effect::LoadSettings { version_id } => self.bridge.run(move |backend| async move {
                let result = backend.get_version_crawling_settings(version_id).await;
                Msg::SettingsLoaded {
                    version_id,
                    result: remote(result),
                }
            }),
            Effect::SaveSettings(request) => self.bridge.run(move |backend| async move {
                let result = backend.save_version_crawling_settings(&request).await;
                Msg::SettingsSaved(remote(result))
            }),
            Effect::ApplyUrlFilters { version_id } => self.bridge.run(move |backend| async move {
                let result = backend.apply_url_filters(version_id).await;
                Msg::UrlFiltersApplied {
                    version_id,
                    result: remote(result),
                }
            }),
            Effect::StartCrawl(request) => self.bridge.run(move |backend| async move {
                let result = backend.start_crawling(&request).await;
                Msg::CrawlStarted {
                    url: request.start_url,
                    result: remote(result),
                }
            }),
            Effect::StopCrawling {
                technology_id,
                version_id,
            } => self.bridge.run(move |backend| async move {
                let result = backend
                    .stop_tech_version_crawling(technology_id, version_id)
                    .await;
                Msg::CrawlingStopped(remote(result))
            }),
            Effect::StopAllCrawling => self.bridge.run(|backend| async move {
                Msg::CrawlingStopped(remote(backend.stop_all_crawling().await))
            }),
            Effect::CleanMarkdown { url_ids } => self.bridge.run(move |backend| async move {
                Msg::MarkdownCleaned(remote(backend.clean_markdown(&url_ids).await))
            }),
            Effect::GenerateSnippets { url_ids } => self.bridge.run(move |backend| async move {
                Msg::SnippetsGenerated(remote(backend.generate_snippets(&url_ids).await))
            }),
            Effect::LoadSnippets { version_id } => self.bridge.run(move |backend| async move {
                let result = backend.get_version_snippets(version_id).await;
                Msg::SnippetsLoaded {
                    version_id,
                    result: remote(result),
                }
            }),
            Effect::SearchSnippets(request) => self.bridge.run(move |backend| async move {
                let result = backend.vector_search(&request).await;
                Msg::SnippetSearchCompleted {
                    query: request.query,
                    result: remote(result),
                }
            }),
            Effect::LoadSnippetDetail { snippet_id } => {
                self.bridge.run(move |backend| async move {
                    let result = backend.get_full_snippet(snippet_id).await;
                    Msg::SnippetDetailLoaded {
                        snippet_id,
                        result: remote(result),
                    }
                })
            }
            Effect::LoadTasks => self.bridge.run(|backend| async move {
                Msg::TasksLoaded(remote(backend.get_tasks().await))
            }),
            Effect::CancelTask { task_id } => self.bridge.run(move |backend| async move {
                let result = backend.cancel_task(&task_id).await;
                Msg::TaskCancelled {
                    task_id,
                    result: remote(result),
                }
            }),
            Effect::LoadProxies => self.bridge.run(|backend| async move {
                Msg::ProxiesLoaded(remote(backend.get_proxies().await))
            }),
            Effect::RefreshProxies => self.bridge.run(|backend| async move {
                Msg::ProxiesLoaded(remote(backend.fetch_and_save_proxies().await))
            }),
        }
    }
}

fn remote<T>(result: Result<T, BridgeError>) -> Remote<T> {
    result.map_err(|err| err.to_string())
}

fn reply_to_msg(reply: BridgeReply<Msg>) -> Msg {
    match reply {
        BridgeReply::Completed(msg) => msg,
        BridgeReply::Events(events) => Msg::EventsReceived(events),
        BridgeReply::EventStreamClosed(reason) => Msg::EventStreamClosed(reason),
    }
}

#[cfg(test)]
mod tests {
    use kb_core::BackendEvent;

    use super::*;

    #[test]
    fn replies_map_onto_messages() {
        assert_eq!(
            reply_to_msg(BridgeReply::Completed(Msg::NoOp)),
            Msg::NoOp
        );
        assert_eq!(
            reply_to_msg(BridgeReply::Events(vec![BackendEvent::TaskCancelled {
                task_id: "t1".into()
            }])),
            Msg::EventsReceived(vec![BackendEvent::TaskCancelled {
                task_id: "t1".into()
            }])
        );
        assert_eq!(
            reply_to_msg(BridgeReply::EventStreamClosed(Some("reset".into()))),
            Msg::EventStreamClosed(Some("reset".into()))
        );
    }

    #[test]
    fn bridge_errors_become_display_strings() {
        let result: Result<(), BridgeError> = Err(BridgeError::Backend {
            status: 404,
            message: "Technology not found".into(),
        });
        assert_eq!(remote(result), Err("Technology not found".to_string()));
    }
}
