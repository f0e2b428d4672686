//! OpenAPI specification endpoint

use axum::Json;

/// GET /api/openapi.json - Get OpenAPI specification
pub async fn openapi_spec() -> Json<serde_json::Value> {
    let goal_id_param = serde_json::json!({
        "name": "goal_id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer" }
    });

    Json(serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Smart Goal Breaker API",
            "description": "AI-powered goal breakdown service",
            "version": env!("CARGO_PKG_VERSION")
        },
        "servers": [
            {
                "url": "http://localhost:8000",
                "description": "Local development server"
            }
        ],
        "paths": {
            "/api/health": {
                "get": {
                    "summary": "Health check",
                    "operationId": "healthCheck",
                    "responses": {
                        "200": {
                            "description": "Server is healthy",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/HealthResponse" }
                                }
                            }
                        }
                    }
                }
            },
            "/api/goals": {
                "get": {
                    "summary": "List the session's goals, newest first",
                    "operationId": "listGoals",
                    "parameters": [
                        { "name": "skip", "in": "query", "schema": { "type": "integer", "default": 0 } },
                        { "name": "limit", "in": "query", "schema": { "type": "integer", "default": 100, "maximum": 100 } }
                    ],
                    "responses": {
                        "200": {
                            "description": "Goals with their tasks",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/GoalResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "summary": "Break down a goal into five steps and save it",
                    "operationId": "createGoal",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/CreateGoalRequest" }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": "Goal created",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/GoalResponse" }
                                }
                            }
                        },
                        "422": { "description": "Invalid goal text" },
                        "500": { "description": "Goal could not be saved" }
                    }
                }
            },
            "/api/goals/{goal_id}": {
                "get": {
                    "summary": "Get a goal",
                    "operationId": "getGoal",
                    "parameters": [goal_id_param.clone()],
                    "responses": {
                        "200": {
                            "description": "Goal with tasks",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/GoalResponse" }
                                }
                            }
                        },
                        "404": { "description": "Goal not found" }
                    }
                },
                "delete": {
                    "summary": "Delete a goal and its tasks",
                    "operationId": "deleteGoal",
                    "parameters": [goal_id_param],
                    "responses": {
                        "200": { "description": "Goal deleted" },
                        "404": { "description": "Goal not found" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "HealthResponse": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "string" },
                        "version": { "type": "string" }
                    }
                },
                "CreateGoalRequest": {
                    "type": "object",
                    "required": ["goal_text"],
                    "properties": {
                        "goal_text": { "type": "string", "minLength": 1, "maxLength": 500 }
                    }
                },
                "TaskResponse": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "task_text": { "type": "string" },
                        "order": { "type": "integer", "minimum": 1, "maximum": 5 },
                        "created_at": { "type": "string", "format": "date-time" }
                    }
                },
                "GoalResponse": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer" },
                        "goal_text": { "type": "string" },
                        "complexity_score": { "type": "integer", "minimum": 1, "maximum": 10 },
                        "created_at": { "type": "string", "format": "date-time" },
                        "tasks": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/TaskResponse" }
                        }
                    }
                },
                "ErrorResponse": {
                    "type": "object",
                    "properties": {
                        "detail": { "type": "string" },
                        "code": { "type": "string" }
                    }
                }
            }
        }
    }))
}
